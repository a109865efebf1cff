//! In-memory document engine.
//!
//! Holds a document as positioned lines of text and searches it with the
//! `regex` crate. Results are reported synchronously from inside
//! [`DocumentEngine::text_search_init`], in engine-native quad order.

use super::{AnnotationLayer, DocumentEngine, RawMatch, SearchCallbacks, TextSearchOptions};
use crate::annotations::{Annotation, AnnotationId};
use crate::config::ViewerConfig;
use crate::error::{Error, Result};
use crate::geometry::Rect;
use crate::search::{RawQuad, SearchMode};
use indexmap::IndexMap;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

const PAGE_MARGIN: f64 = 72.0;
const LINE_PITCH: f64 = 14.0;
const LINE_HEIGHT: f64 = 12.0;
const CHAR_WIDTH: f64 = 6.0;

/// A line of text with its box on the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryLine {
    /// Line text
    pub text: String,
    /// Line box in page coordinates
    pub bbox: Rect,
}

/// One page of positioned lines.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryPage {
    /// Lines top to bottom
    pub lines: Vec<MemoryLine>,
}

/// A document made of positioned text lines.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryDocument {
    /// Pages in order (page 1 first)
    pub pages: Vec<MemoryPage>,
}

impl MemoryDocument {
    /// Lay out plain text pages with fixed metrics: one line per `\n`,
    /// fixed-width characters, 72pt margins.
    pub fn from_text_pages<S: AsRef<str>>(pages: &[S]) -> Self {
        let pages = pages
            .iter()
            .map(|page| MemoryPage {
                lines: page
                    .as_ref()
                    .lines()
                    .enumerate()
                    .map(|(i, text)| MemoryLine {
                        text: text.to_string(),
                        bbox: Rect::new(
                            PAGE_MARGIN,
                            PAGE_MARGIN + i as f64 * LINE_PITCH,
                            text.chars().count() as f64 * CHAR_WIDTH,
                            LINE_HEIGHT,
                        ),
                    })
                    .collect(),
            })
            .collect();
        Self { pages }
    }

    /// Parse a document from JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a document from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&json)
    }

    /// Number of pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

#[derive(Debug, Clone)]
struct StoredAnnotation {
    annotation: Annotation,
    drawn: bool,
}

/// In-memory annotation layer.
///
/// Added annotations stay undrawn until [`redraw`](AnnotationLayer::redraw)
/// is called for them, like the real viewer.
#[derive(Debug, Default)]
pub struct MemoryAnnotationLayer {
    next_id: u64,
    entries: IndexMap<AnnotationId, StoredAnnotation>,
    redraw_calls: usize,
    last_redraw_region: Option<Rect>,
}

impl MemoryAnnotationLayer {
    /// Create an empty layer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an annotation has been rendered.
    pub fn is_drawn(&self, id: AnnotationId) -> bool {
        self.entries.get(&id).is_some_and(|e| e.drawn)
    }

    /// Annotations currently rendered on screen.
    pub fn visible_annotations(&self) -> Vec<&Annotation> {
        self.entries
            .values()
            .filter(|e| e.drawn)
            .map(|e| &e.annotation)
            .collect()
    }

    /// Number of annotations held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the layer holds nothing.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of redraw calls received.
    pub fn redraw_calls(&self) -> usize {
        self.redraw_calls
    }

    /// Region repainted by the last redraw: the union of the redrawn
    /// annotations' areas. Ignores pages.
    pub fn last_redraw_region(&self) -> Option<Rect> {
        self.last_redraw_region
    }
}

impl AnnotationLayer for MemoryAnnotationLayer {
    fn list_annotations(&self) -> Vec<AnnotationId> {
        self.entries.keys().copied().collect()
    }

    fn get_annotation(&self, id: AnnotationId) -> Option<&Annotation> {
        self.entries.get(&id).map(|e| &e.annotation)
    }

    fn delete_annotations(&mut self, ids: &[AnnotationId]) -> Result<()> {
        for id in ids {
            self.entries
                .shift_remove(id)
                .ok_or(Error::UnknownAnnotation(id.0))?;
        }
        Ok(())
    }

    fn add_annotations(&mut self, annotations: Vec<Annotation>) -> Result<Vec<AnnotationId>> {
        let mut ids = Vec::with_capacity(annotations.len());
        for annotation in annotations {
            self.next_id += 1;
            let id = AnnotationId(self.next_id);
            self.entries.insert(
                id,
                StoredAnnotation {
                    annotation,
                    drawn: false,
                },
            );
            ids.push(id);
        }
        Ok(ids)
    }

    fn redraw(&mut self, ids: &[AnnotationId]) -> Result<()> {
        self.redraw_calls += 1;
        let mut region: Option<Rect> = None;
        for id in ids {
            let entry = self
                .entries
                .get_mut(id)
                .ok_or(Error::UnknownAnnotation(id.0))?;
            entry.drawn = true;
            if let Some(rect) = entry.annotation.rect() {
                region = Some(match region {
                    Some(acc) => acc.union(&rect),
                    None => rect,
                });
            }
        }
        log::debug!("redrew {} annotation(s), region {:?}", ids.len(), region);
        self.last_redraw_region = region;
        Ok(())
    }
}

/// Document engine backed by a [`MemoryDocument`].
#[derive(Debug)]
pub struct MemoryEngine {
    asset_path: String,
    document: Option<MemoryDocument>,
    user: String,
    default_mode: SearchMode,
    annotations: MemoryAnnotationLayer,
    fault_pages: HashSet<u32>,
    search_log: Vec<(String, SearchMode)>,
}

impl MemoryEngine {
    /// Create an engine with a document already loaded.
    pub fn with_document(document: MemoryDocument) -> Self {
        Self {
            asset_path: ViewerConfig::default().path,
            document: Some(document),
            user: "Guest".to_string(),
            default_mode: SearchMode::LEGACY_DEFAULT,
            annotations: MemoryAnnotationLayer::new(),
            fault_pages: HashSet::new(),
            search_log: Vec::new(),
        }
    }

    /// Replace the loaded document.
    pub fn load_document(&mut self, document: MemoryDocument) {
        self.document = Some(document);
    }

    /// Report every match on `page_number` through the error callback.
    pub fn with_fault_page(mut self, page_number: u32) -> Self {
        self.fault_pages.insert(page_number);
        self
    }

    /// Location of the engine's runtime assets.
    pub fn asset_path(&self) -> &str {
        &self.asset_path
    }

    /// Terms and modes of every search pass started, in order.
    pub fn search_log(&self) -> &[(String, SearchMode)] {
        &self.search_log
    }

    /// The concrete annotation layer.
    pub fn annotations(&self) -> &MemoryAnnotationLayer {
        &self.annotations
    }

    fn build_regex(term: &str, mode: SearchMode) -> Result<Regex> {
        let mut pattern = if mode.is_regex() {
            term.to_string()
        } else {
            regex::escape(term)
        };

        if mode.contains(SearchMode::WHOLE_WORD) {
            pattern = format!(r"\b(?:{})\b", pattern);
        }

        RegexBuilder::new(&pattern)
            .case_insensitive(!mode.is_case_sensitive())
            .build()
            .map_err(|e| Error::InvalidPattern(e.to_string()))
    }

    /// Engine-native quad covering `[start, end)` byte range of a line.
    fn match_quad(line: &MemoryLine, start: usize, end: usize) -> RawQuad {
        let total = line.text.chars().count().max(1) as f64;
        let start_chars = line.text[..start].chars().count() as f64;
        let end_chars = line.text[..end].chars().count() as f64;

        let x0 = line.bbox.left() + line.bbox.width * start_chars / total;
        let x1 = line.bbox.left() + line.bbox.width * end_chars / total;
        RawQuad::from_rect(&Rect::from_points(x0, line.bbox.top(), x1, line.bbox.bottom()))
    }
}

impl DocumentEngine for MemoryEngine {
    fn initialize(config: &ViewerConfig) -> Result<Self> {
        config.validate()?;
        log::debug!("engine assets at '{}'", config.path);
        if config.license_key.is_none() {
            log::info!("initializing engine without a license key (demo mode)");
        }

        let document = match &config.initial_doc {
            Some(path) => Some(MemoryDocument::from_file(path).map_err(|e| {
                Error::EngineInit(format!("cannot load {}: {}", path.display(), e))
            })?),
            None => None,
        };

        Ok(Self {
            asset_path: config.path.clone(),
            document,
            user: config.author.clone().unwrap_or_else(|| "Guest".to_string()),
            default_mode: config.default_search_mode().unwrap_or(SearchMode::LEGACY_DEFAULT),
            annotations: MemoryAnnotationLayer::new(),
            fault_pages: HashSet::new(),
            search_log: Vec::new(),
        })
    }

    fn is_document_loaded(&self) -> bool {
        self.document.is_some()
    }

    fn current_user(&self) -> String {
        self.user.clone()
    }

    fn default_search_mode(&self) -> SearchMode {
        self.default_mode
    }

    fn text_search_init(
        &mut self,
        term: &str,
        mode: SearchMode,
        options: TextSearchOptions,
        callbacks: SearchCallbacks,
    ) -> Result<()> {
        let document = self.document.as_ref().ok_or(Error::EngineNotReady)?;
        self.search_log.push((term.to_string(), mode));

        let regex = match Self::build_regex(term, mode) {
            Ok(regex) => regex,
            Err(e) => {
                callbacks.on_error(e.to_string());
                callbacks.on_document_end();
                return Ok(());
            },
        };

        // Without full search only the first page is scanned.
        let page_limit = if options.full_search {
            document.pages.len()
        } else {
            document.pages.len().min(1)
        };

        for (index, page) in document.pages.iter().take(page_limit).enumerate() {
            let page_number = index as u32 + 1;
            for line in &page.lines {
                for found in regex.find_iter(&line.text) {
                    if found.start() == found.end() {
                        continue;
                    }
                    let delivered = if self.fault_pages.contains(&page_number) {
                        callbacks.on_error(format!("malformed geometry on page {}", page_number))
                    } else {
                        callbacks.on_result(RawMatch {
                            page_number,
                            quads: vec![Self::match_quad(line, found.start(), found.end())],
                            text: Some(found.as_str().to_string()),
                        })
                    };
                    if !delivered {
                        log::debug!("search listener for '{}' went away", term);
                        return Ok(());
                    }
                }
            }
        }

        callbacks.on_document_end();
        Ok(())
    }

    fn annotation_layer(&self) -> &dyn AnnotationLayer {
        &self.annotations
    }

    fn annotation_layer_mut(&mut self) -> &mut dyn AnnotationLayer {
        &mut self.annotations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::SearchEvent;

    fn collect(engine: &mut MemoryEngine, term: &str, mode: SearchMode) -> Vec<SearchEvent> {
        let (callbacks, receiver) = SearchCallbacks::channel();
        engine
            .text_search_init(term, mode, TextSearchOptions::default(), callbacks)
            .unwrap();
        receiver.try_iter().collect()
    }

    fn results(events: &[SearchEvent]) -> Vec<&RawMatch> {
        events
            .iter()
            .filter_map(|e| match e {
                SearchEvent::Result(m) => Some(m),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_layout_from_text() {
        let doc = MemoryDocument::from_text_pages(&["ab\ncd", "e"]);
        assert_eq!(doc.page_count(), 2);
        assert_eq!(doc.pages[0].lines[1].bbox, Rect::new(72.0, 86.0, 12.0, 12.0));
    }

    #[test]
    fn test_case_insensitive_literal_search() {
        let mut engine =
            MemoryEngine::with_document(MemoryDocument::from_text_pages(&["Important imports"]));
        let events = collect(&mut engine, "im", SearchMode::LEGACY_DEFAULT);

        assert_eq!(results(&events).len(), 2);
        assert_eq!(events.last(), Some(&SearchEvent::DocumentEnd));
    }

    #[test]
    fn test_case_sensitive_search() {
        let mut engine =
            MemoryEngine::with_document(MemoryDocument::from_text_pages(&["Important imports"]));
        let events = collect(&mut engine, "im", SearchMode::CASE_SENSITIVE);
        let found = results(&events);

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].text.as_deref(), Some("im"));
    }

    #[test]
    fn test_literal_search_escapes_pattern() {
        let mut engine =
            MemoryEngine::with_document(MemoryDocument::from_text_pages(&["a.b axb"]));
        assert_eq!(results(&collect(&mut engine, "a.b", SearchMode::empty())).len(), 1);
        assert_eq!(results(&collect(&mut engine, "a.b", SearchMode::REGEX)).len(), 2);
    }

    #[test]
    fn test_match_quad_geometry() {
        let mut engine = MemoryEngine::with_document(MemoryDocument::from_text_pages(&["xxpo"]));
        let events = collect(&mut engine, "po", SearchMode::empty());
        let found = results(&events);

        let quad = found[0].quads[0];
        assert_eq!((quad.x1, quad.y1), (84.0, 72.0));
        assert_eq!((quad.x3, quad.y3), (96.0, 84.0));
    }

    #[test]
    fn test_invalid_regex_reports_error_then_ends() {
        let mut engine = MemoryEngine::with_document(MemoryDocument::from_text_pages(&["text"]));
        let events = collect(&mut engine, "(", SearchMode::REGEX);

        assert!(matches!(events[0], SearchEvent::Error(_)));
        assert_eq!(events[1], SearchEvent::DocumentEnd);
    }

    #[test]
    fn test_fault_page_reports_errors() {
        let mut engine =
            MemoryEngine::with_document(MemoryDocument::from_text_pages(&["im", "im"]))
                .with_fault_page(2);
        let events = collect(&mut engine, "im", SearchMode::empty());

        assert_eq!(results(&events).len(), 1);
        assert!(events.iter().any(|e| matches!(e, SearchEvent::Error(_))));
    }

    #[test]
    fn test_initialize_uses_config() {
        let mut config = ViewerConfig::new().with_author("Reviewer");
        config.path = "/viewer/lib".to_string();
        let engine = MemoryEngine::initialize(&config).unwrap();

        assert_eq!(engine.asset_path(), "/viewer/lib");
        assert_eq!(engine.current_user(), "Reviewer");
        assert!(!engine.is_document_loaded());

        config.path = String::new();
        assert!(matches!(MemoryEngine::initialize(&config), Err(Error::Config(_))));
    }

    #[test]
    fn test_search_without_document_fails() {
        let mut engine = MemoryEngine::initialize(&ViewerConfig::default()).unwrap();
        let (callbacks, _receiver) = SearchCallbacks::channel();
        let err = engine
            .text_search_init("im", SearchMode::empty(), TextSearchOptions::default(), callbacks)
            .unwrap_err();
        assert!(matches!(err, Error::EngineNotReady));
    }

    #[test]
    fn test_annotation_layer_redraw() {
        let mut layer = MemoryAnnotationLayer::new();
        let rect = crate::annotations::RectangleAnnotation::new(1, Rect::new(0.0, 0.0, 1.0, 1.0));
        let ids = layer.add_annotations(vec![rect.into()]).unwrap();

        assert!(!layer.is_drawn(ids[0]));
        assert!(layer.visible_annotations().is_empty());

        layer.redraw(&ids).unwrap();
        assert!(layer.is_drawn(ids[0]));
        assert_eq!(layer.redraw_calls(), 1);
        assert_eq!(layer.last_redraw_region(), Some(Rect::new(0.0, 0.0, 1.0, 1.0)));

        layer.delete_annotations(&ids).unwrap();
        assert!(layer.is_empty());
        assert!(matches!(
            layer.delete_annotations(&ids),
            Err(Error::UnknownAnnotation(_))
        ));
    }
}
