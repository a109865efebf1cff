//! Tests for the search → materialize → sync pipeline.

use highlight_oxide::annotations::{Annotation, AnnotationColor, HighlightAnnotation};
use highlight_oxide::engine::memory::MemoryAnnotationLayer;
use highlight_oxide::engine::{
    AnnotationLayer, DocumentEngine, MemoryDocument, MemoryEngine, RawMatch, SearchCallbacks,
    TextSearchOptions,
};
use highlight_oxide::geometry::{Quad, Rect};
use highlight_oxide::highlight::{materialize, HighlightDefinition, MaterializeOptions, Rgb};
use highlight_oxide::search::{RawQuad, RunStatus, SearchMode, SequentialSearchDriver, TermId};
use highlight_oxide::sync::AnnotationSync;
use highlight_oxide::{Error, HighlightSession, Result, ViewerConfig};
use std::thread;
use std::time::Duration;

fn terms() -> Vec<(TermId, HighlightDefinition)> {
    vec![
        (TermId::from("1"), HighlightDefinition::new("im", Rgb::new(255, 0, 0))),
        (TermId::from("2"), HighlightDefinition::new("po", Rgb::new(0, 255, 0))),
    ]
}

fn raw_match(page: u32) -> RawMatch {
    RawMatch::new(page, vec![RawQuad::from_rect(&Rect::new(72.0, 72.0, 12.0, 12.0))])
}

/// Engine that holds each search session open until the test ends it.
struct DeferredEngine {
    layer: MemoryAnnotationLayer,
    session: Option<SearchCallbacks>,
    started: Vec<String>,
    overlapped: bool,
}

impl DeferredEngine {
    fn new() -> Self {
        Self {
            layer: MemoryAnnotationLayer::new(),
            session: None,
            started: Vec::new(),
            overlapped: false,
        }
    }

    fn emit(&self, result: RawMatch) {
        self.session.as_ref().expect("no session in flight").on_result(result);
    }

    fn emit_error(&self, reason: &str) {
        self.session.as_ref().expect("no session in flight").on_error(reason);
    }

    fn end(&mut self) {
        self.session.take().expect("no session in flight").on_document_end();
    }

    fn hang_up(&mut self) {
        self.session.take();
    }
}

impl DocumentEngine for DeferredEngine {
    fn initialize(_config: &ViewerConfig) -> Result<Self> {
        Ok(Self::new())
    }

    fn is_document_loaded(&self) -> bool {
        true
    }

    fn current_user(&self) -> String {
        "Tester".to_string()
    }

    fn default_search_mode(&self) -> SearchMode {
        SearchMode::LEGACY_DEFAULT
    }

    fn text_search_init(
        &mut self,
        term: &str,
        _mode: SearchMode,
        _options: TextSearchOptions,
        callbacks: SearchCallbacks,
    ) -> Result<()> {
        if self.session.is_some() {
            self.overlapped = true;
        }
        self.started.push(term.to_string());
        self.session = Some(callbacks);
        Ok(())
    }

    fn annotation_layer(&self) -> &dyn AnnotationLayer {
        &self.layer
    }

    fn annotation_layer_mut(&mut self) -> &mut dyn AnnotationLayer {
        &mut self.layer
    }
}

/// Engine that reports from a worker thread after a delay.
struct ThreadedEngine {
    layer: MemoryAnnotationLayer,
}

impl DocumentEngine for ThreadedEngine {
    fn initialize(_config: &ViewerConfig) -> Result<Self> {
        Ok(Self {
            layer: MemoryAnnotationLayer::new(),
        })
    }

    fn is_document_loaded(&self) -> bool {
        true
    }

    fn current_user(&self) -> String {
        "Worker".to_string()
    }

    fn default_search_mode(&self) -> SearchMode {
        SearchMode::LEGACY_DEFAULT
    }

    fn text_search_init(
        &mut self,
        term: &str,
        _mode: SearchMode,
        _options: TextSearchOptions,
        callbacks: SearchCallbacks,
    ) -> Result<()> {
        let hits = term.len() as u32;
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(10));
            for page in 1..=hits {
                callbacks.on_result(raw_match(page));
            }
            callbacks.on_document_end();
        });
        Ok(())
    }

    fn annotation_layer(&self) -> &dyn AnnotationLayer {
        &self.layer
    }

    fn annotation_layer_mut(&mut self) -> &mut dyn AnnotationLayer {
        &mut self.layer
    }
}

mod sequential_driver {
    use super::*;

    #[test]
    fn test_one_occurrence_each_publishes_two_groups() {
        let mut engine = MemoryEngine::with_document(MemoryDocument::from_text_pages(&["him spot"]));
        let mut driver = SequentialSearchDriver::new();

        let store = driver.run(&mut engine, terms()).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("1").unwrap().len(), 1);
        assert_eq!(store.get("2").unwrap().len(), 1);
    }

    #[test]
    fn test_next_term_waits_for_document_end() {
        let mut engine = DeferredEngine::new();
        let mut driver = SequentialSearchDriver::new();

        assert_eq!(driver.start(&mut engine, terms()).unwrap(), RunStatus::Searching);
        assert_eq!(engine.started, vec!["im"]);

        engine.emit(raw_match(1));
        assert_eq!(driver.pump(&mut engine).unwrap(), RunStatus::Searching);
        assert_eq!(engine.started, vec!["im"]);
        assert_eq!(driver.current_term(), Some(&TermId::from("1")));

        engine.end();
        assert_eq!(driver.pump(&mut engine).unwrap(), RunStatus::Searching);
        assert_eq!(engine.started, vec!["im", "po"]);

        engine.emit(raw_match(2));
        engine.end();
        assert_eq!(driver.pump(&mut engine).unwrap(), RunStatus::Complete);
        assert!(!engine.overlapped);

        let store = driver.results().unwrap();
        assert_eq!(store.len(), 2);
        assert!(store.iter().all(|(_, group)| !group.is_empty()));
    }

    #[test]
    fn test_in_flight_results_are_not_visible() {
        let mut engine = DeferredEngine::new();
        let mut driver = SequentialSearchDriver::new();
        driver.start(&mut engine, terms()).unwrap();

        engine.emit(raw_match(1));
        engine.emit(raw_match(2));
        driver.pump(&mut engine).unwrap();

        assert!(driver.committed().is_empty());
        assert!(matches!(driver.results(), Err(Error::RunNotComplete)));

        engine.end();
        driver.pump(&mut engine).unwrap();
        assert_eq!(driver.committed().get("1").unwrap().len(), 2);
        assert!(!driver.committed().contains("2"));
        assert!(matches!(driver.results(), Err(Error::RunNotComplete)));
    }

    #[test]
    fn test_second_run_rejected_while_in_flight() {
        let mut engine = DeferredEngine::new();
        let mut driver = SequentialSearchDriver::new();
        driver.start(&mut engine, terms()).unwrap();

        let err = driver.start(&mut engine, terms()).unwrap_err();
        assert!(matches!(err, Error::RunInProgress));
        assert_eq!(engine.started, vec!["im"]);
    }

    #[test]
    fn test_error_callback_keeps_pass_alive() {
        let mut engine = DeferredEngine::new();
        let mut driver = SequentialSearchDriver::new();
        driver.start(&mut engine, terms()[..1].to_vec()).unwrap();

        engine.emit(raw_match(1));
        engine.emit_error("engine fault");
        engine.emit(RawMatch::new(
            2,
            vec![RawQuad {
                y4: f64::NAN,
                ..RawQuad::default()
            }],
        ));
        engine.emit(raw_match(3));
        engine.end();

        assert_eq!(driver.pump(&mut engine).unwrap(), RunStatus::Complete);
        assert_eq!(driver.results().unwrap().get("1").unwrap().pages(), vec![1, 3]);
        assert_eq!(driver.match_errors().len(), 2);
        assert!(driver.match_errors().iter().all(Error::is_per_match));
    }

    #[test]
    fn test_engine_hang_up_abandons_run() {
        let mut engine = DeferredEngine::new();
        let mut driver = SequentialSearchDriver::new();
        driver.start(&mut engine, terms()).unwrap();

        engine.hang_up();
        let err = driver.pump(&mut engine).unwrap_err();
        assert!(matches!(err, Error::EngineDisconnected { ref term_id } if term_id == "1"));
        assert_eq!(driver.status(), RunStatus::Idle);

        // A new run may start after the abandoned one.
        assert!(driver.start(&mut engine, terms()).is_ok());
    }

    #[test]
    fn test_wait_for_threaded_engine() {
        let mut engine = ThreadedEngine::initialize(&ViewerConfig::default()).unwrap();
        let mut driver = SequentialSearchDriver::new();

        let store = driver
            .run(
                &mut engine,
                vec![
                    (TermId::from("a"), HighlightDefinition::new("xy", Rgb::new(1, 2, 3))),
                    (TermId::from("b"), HighlightDefinition::new("xyz", Rgb::new(4, 5, 6))),
                ],
            )
            .unwrap();
        assert_eq!(store.get("a").unwrap().len(), 2);
        assert_eq!(store.get("b").unwrap().len(), 3);
    }
}

mod annotation_sync {
    use super::*;

    fn highlights(pages: &[u32], color: AnnotationColor) -> Vec<HighlightAnnotation> {
        pages
            .iter()
            .map(|&page| {
                HighlightAnnotation::new(
                    page,
                    vec![Quad::from_rect(&Rect::new(0.0, 0.0, 5.0, 5.0))],
                    color,
                )
            })
            .collect()
    }

    fn layer_pages(layer: &MemoryAnnotationLayer) -> Vec<u32> {
        layer
            .list_annotations()
            .into_iter()
            .filter_map(|id| layer.get_annotation(id))
            .map(Annotation::page_number)
            .collect()
    }

    #[test]
    fn test_second_sync_replaces_first() {
        let mut layer = MemoryAnnotationLayer::new();
        let a = highlights(&[1, 2, 3], AnnotationColor::rgb(255, 0, 0));
        let b = highlights(&[7, 8], AnnotationColor::rgb(0, 255, 0));

        AnnotationSync::sync(&mut layer, a).unwrap();
        let report = AnnotationSync::sync(&mut layer, b).unwrap();

        assert_eq!(report.removed, 3);
        assert_eq!(layer_pages(&layer), vec![7, 8]);
        assert_eq!(layer.visible_annotations().len(), 2);
    }

    #[test]
    fn test_empty_sync_clears_any_state() {
        let mut layer = MemoryAnnotationLayer::new();
        AnnotationSync::sync(&mut layer, highlights(&[1, 1, 2], AnnotationColor::default()))
            .unwrap();

        AnnotationSync::sync(&mut layer, Vec::new()).unwrap();
        assert!(layer.is_empty());

        let report = AnnotationSync::sync(&mut layer, Vec::new()).unwrap();
        assert_eq!(report.removed, 0);
        assert!(layer.visible_annotations().is_empty());
    }

    #[test]
    fn test_new_highlights_are_drawn() {
        let mut layer = MemoryAnnotationLayer::new();
        let report =
            AnnotationSync::sync(&mut layer, highlights(&[1], AnnotationColor::default())).unwrap();
        assert!(layer.is_drawn(report.added[0]));
        assert_eq!(layer.redraw_calls(), 1);
    }
}

mod materialization {
    use super::*;

    #[test]
    fn test_term_without_matches_emits_nothing() {
        let mut engine = MemoryEngine::with_document(MemoryDocument::from_text_pages(&["import"]));
        let mut driver = SequentialSearchDriver::new();
        let run = vec![
            (TermId::from("1"), HighlightDefinition::new("im", Rgb::new(255, 0, 0))),
            (TermId::from("2"), HighlightDefinition::new("zz", Rgb::new(0, 255, 0))),
        ];
        driver.run(&mut engine, run).unwrap();

        let store = driver.results().unwrap();
        assert!(store.get("2").unwrap().is_empty());

        let out = materialize(store, driver.definitions(), &MaterializeOptions::default());
        assert_eq!(out.len(), 1);
        assert!(out.iter().all(|h| h.term_id == Some(TermId::from("1"))));
        assert!(out.iter().all(|h| !h.quads.is_empty()));
    }
}

mod session {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_initialize_from_config_file() {
        let mut doc_file = tempfile::NamedTempFile::new().unwrap();
        let document = MemoryDocument::from_text_pages(&["Import policy", "Portable"]);
        write!(doc_file, "{}", serde_json::to_string(&document).unwrap()).unwrap();

        let config = ViewerConfig::new()
            .with_initial_doc(doc_file.path())
            .with_author("Reviewer");
        let mut session = HighlightSession::<MemoryEngine>::initialize(&config).unwrap();

        let report = session
            .search_and_highlight(vec![(
                TermId::from("p"),
                HighlightDefinition::new("po", Rgb::new(0, 0, 255)).with_case_sensitive(true),
            )])
            .unwrap();

        // "Import policy" has "po" twice; "Portable" is upper case.
        assert_eq!(report.added.len(), 2);
        let layer = session.engine().annotation_layer();
        let first = layer.get_annotation(report.added[0]).unwrap();
        assert_eq!(first.author(), Some("Reviewer"));
    }

    #[test]
    fn test_initialize_fails_for_missing_document() {
        let config = ViewerConfig::new().with_initial_doc("/nonexistent/document.json");
        let result = HighlightSession::<MemoryEngine>::initialize(&config);
        assert!(matches!(result, Err(Error::EngineInit(_))));
    }

    #[test]
    fn test_rerun_replaces_previous_highlights() {
        let mut session = HighlightSession::with_engine(MemoryEngine::with_document(
            MemoryDocument::from_text_pages(&["import export"]),
        ));
        session.search_and_highlight(terms()).unwrap();
        let report = session
            .search_and_highlight(vec![(
                TermId::from("3"),
                HighlightDefinition::new("ex", Rgb::new(0, 0, 255)),
            )])
            .unwrap();

        // "im" once, "po" in both words
        assert_eq!(report.removed, 3);
        assert_eq!(report.added.len(), 1);
        assert_eq!(session.engine().annotations().len(), 1);
    }
}
