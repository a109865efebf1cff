//! Search → materialize → sync, wired together around one engine.

use crate::annotations::{AnnotationId, HighlightAnnotation, RectangleAnnotation};
use crate::config::ViewerConfig;
use crate::engine::{DocumentEngine, TextSearchOptions};
use crate::error::{Error, Result};
use crate::geometry::Rect;
use crate::highlight::{materialize_by_term, HighlightDefinition, MaterializeOptions};
use crate::search::{ResultStore, SequentialSearchDriver, TermId};
use crate::sync::{AnnotationSync, SyncReport};
use indexmap::IndexMap;

/// One engine plus the state of its highlight runs.
///
/// Stages never overlap: the driver publishes results, then the session
/// materializes and syncs them.
pub struct HighlightSession<E: DocumentEngine> {
    engine: E,
    driver: SequentialSearchDriver,
    highlights: IndexMap<TermId, Vec<HighlightAnnotation>>,
}

impl<E: DocumentEngine> HighlightSession<E> {
    /// Initialize the engine from configuration.
    ///
    /// Engine initialization failure is fatal: no session is created.
    pub fn initialize(config: &ViewerConfig) -> Result<Self> {
        let engine = E::initialize(config)?;
        log::info!("engine initialized for user '{}'", engine.current_user());
        Ok(Self::with_engine_options(
            engine,
            TextSearchOptions {
                full_search: config.full_search,
            },
        ))
    }

    /// Wrap an already initialized engine.
    pub fn with_engine(engine: E) -> Self {
        Self::with_engine_options(engine, TextSearchOptions::default())
    }

    fn with_engine_options(engine: E, options: TextSearchOptions) -> Self {
        Self {
            engine,
            driver: SequentialSearchDriver::with_options(options),
            highlights: IndexMap::new(),
        }
    }

    /// The engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// The engine, mutably.
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// The search driver.
    pub fn driver(&self) -> &SequentialSearchDriver {
        &self.driver
    }

    /// Highlights of the last sync, grouped by term.
    pub fn highlights(&self) -> &IndexMap<TermId, Vec<HighlightAnnotation>> {
        &self.highlights
    }

    /// Results of the last completed run.
    pub fn results(&self) -> Result<&ResultStore> {
        self.driver.results()
    }

    /// Place a rectangle on a loaded document, authored by the current user,
    /// and draw it immediately.
    pub fn on_document_loaded(&mut self, page_number: u32, rect: Rect) -> Result<AnnotationId> {
        let marker =
            RectangleAnnotation::new(page_number, rect).with_author(self.engine.current_user());
        let layer = self.engine.annotation_layer_mut();
        let ids = layer.add_annotations(vec![marker.into()])?;
        layer.redraw(&ids)?;
        let id = ids
            .first()
            .copied()
            .ok_or_else(|| Error::Engine("annotation layer returned no id for marker".into()))?;
        log::debug!("document loaded, marker {} placed on page {}", id, page_number);
        Ok(id)
    }

    /// Search every term in order, then replace the annotation layer with
    /// the resulting highlights.
    pub fn search_and_highlight(
        &mut self,
        terms: Vec<(TermId, HighlightDefinition)>,
    ) -> Result<SyncReport> {
        self.driver.run(&mut self.engine, terms)?;
        self.refresh()
    }

    /// Re-materialize the last published results and sync them again.
    ///
    /// This is also the recovery path after a failed sync.
    pub fn refresh(&mut self) -> Result<SyncReport> {
        let options = MaterializeOptions::default().with_author(self.engine.current_user());
        let store = self.driver.results()?;
        let by_term = materialize_by_term(store, self.driver.definitions(), &options);

        let annotations: Vec<HighlightAnnotation> = by_term.values().flatten().cloned().collect();
        let report = AnnotationSync::sync(self.engine.annotation_layer_mut(), annotations)?;
        self.highlights = by_term;
        Ok(report)
    }

    /// Remove every annotation from the layer.
    pub fn clear_annotations(&mut self) -> Result<SyncReport> {
        self.highlights.clear();
        AnnotationSync::clear(self.engine.annotation_layer_mut())
    }
}
