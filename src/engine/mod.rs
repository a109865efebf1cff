//! Boundary with the document engine.
//!
//! The engine owns the document, its single global search session and the
//! annotation layer. This crate only drives it through the traits below.
//! [`memory::MemoryEngine`] is an in-process implementation used by the demo
//! binary and the tests.
//!
//! Search callbacks travel over a channel created per search pass, so an
//! engine may report results synchronously from inside
//! [`DocumentEngine::text_search_init`] or later from another thread.

pub mod memory;

use crate::annotations::{Annotation, AnnotationId};
use crate::config::ViewerConfig;
use crate::error::Result;
use crate::search::{RawQuad, SearchMode};
use serde::{Deserialize, Serialize};
use std::sync::mpsc::{self, Receiver, Sender};

pub use memory::{MemoryDocument, MemoryEngine, MemoryLine, MemoryPage};

/// One match reported by the engine during a search pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawMatch {
    /// 1-based page number
    pub page_number: u32,
    /// Engine-native quads covering the match
    pub quads: Vec<RawQuad>,
    /// Matched text, when the engine provides it
    pub text: Option<String>,
}

impl RawMatch {
    /// Create a match without text.
    pub fn new(page_number: u32, quads: Vec<RawQuad>) -> Self {
        Self {
            page_number,
            quads,
            text: None,
        }
    }
}

/// Event delivered by the engine during a search pass.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchEvent {
    /// A match was found
    Result(RawMatch),
    /// A single match could not be reported
    Error(String),
    /// The full-document pass is finished
    DocumentEnd,
}

/// Options passed with each search request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextSearchOptions {
    /// Search the whole document in one pass
    pub full_search: bool,
}

impl Default for TextSearchOptions {
    fn default() -> Self {
        Self { full_search: true }
    }
}

/// Callback handle given to the engine for one search pass.
///
/// Cloneable and `Send`; the pass ends at the first
/// [`on_document_end`](Self::on_document_end). Dropping every clone without
/// signalling document end abandons the pass.
#[derive(Debug, Clone)]
pub struct SearchCallbacks {
    sender: Sender<SearchEvent>,
}

impl SearchCallbacks {
    /// Create a callback handle and the receiver that observes it.
    pub fn channel() -> (Self, Receiver<SearchEvent>) {
        let (sender, receiver) = mpsc::channel();
        (Self { sender }, receiver)
    }

    /// Report a match. Returns `false` once nobody is listening any more.
    pub fn on_result(&self, result: RawMatch) -> bool {
        self.sender.send(SearchEvent::Result(result)).is_ok()
    }

    /// Report a per-match failure.
    pub fn on_error(&self, reason: impl Into<String>) -> bool {
        self.sender.send(SearchEvent::Error(reason.into())).is_ok()
    }

    /// Signal the end of the full-document pass.
    pub fn on_document_end(self) {
        let _ = self.sender.send(SearchEvent::DocumentEnd);
    }
}

/// The engine's annotation storage and renderer.
pub trait AnnotationLayer {
    /// Ids of every annotation currently held, in insertion order.
    fn list_annotations(&self) -> Vec<AnnotationId>;

    /// Look up an annotation.
    fn get_annotation(&self, id: AnnotationId) -> Option<&Annotation>;

    /// Remove annotations.
    fn delete_annotations(&mut self, ids: &[AnnotationId]) -> Result<()>;

    /// Add annotations, returning their new ids in input order.
    ///
    /// Added annotations are not visible until [`redraw`](Self::redraw).
    fn add_annotations(&mut self, annotations: Vec<Annotation>) -> Result<Vec<AnnotationId>>;

    /// Force an immediate render of the given annotations.
    fn redraw(&mut self, ids: &[AnnotationId]) -> Result<()>;
}

/// The document engine.
pub trait DocumentEngine {
    /// Initialize the engine and load the configured document.
    fn initialize(config: &ViewerConfig) -> Result<Self>
    where
        Self: Sized;

    /// Whether a document is loaded and searchable.
    fn is_document_loaded(&self) -> bool;

    /// Name used as author for new annotations.
    fn current_user(&self) -> String;

    /// The engine's own no-option search mode.
    fn default_search_mode(&self) -> SearchMode;

    /// Start a search pass for one term.
    ///
    /// The engine has a single global search session; callers must not start
    /// a second pass before the first one signalled document end.
    fn text_search_init(
        &mut self,
        term: &str,
        mode: SearchMode,
        options: TextSearchOptions,
        callbacks: SearchCallbacks,
    ) -> Result<()>;

    /// The annotation layer.
    fn annotation_layer(&self) -> &dyn AnnotationLayer;

    /// The annotation layer, mutably.
    fn annotation_layer_mut(&mut self) -> &mut dyn AnnotationLayer;
}
