// Allow some clippy lints that are too pedantic for this project
#![allow(clippy::needless_range_loop)]
// Allow unused for tests
#![cfg_attr(test, allow(dead_code))]

//! # Highlight Oxide
//!
//! Multi-term search highlighting on top of a document viewer engine.
//!
//! ## Core Features
//!
//! - **Sequential search**: one full-document pass per term against an engine
//!   with a single, callback-driven search session
//! - **Result aggregation**: per-term result groups committed only when the
//!   engine reports document end
//! - **Quad normalization**: engine-native match geometry mapped into
//!   canonical highlight quads
//! - **Materialization**: one colored highlight annotation per match
//! - **Annotation sync**: clear, add and redraw in one step so new highlights
//!   are visible immediately
//!
//! ## Architecture
//!
//! The document engine is a trait ([`engine::DocumentEngine`]); the crate
//! ships an in-memory implementation ([`engine::MemoryEngine`]) used by the
//! demo binary and the tests. Stages run strictly one after another:
//! search → aggregate → materialize → sync.
//!
//! ## Quick Start
//!
//! ```
//! use highlight_oxide::engine::{MemoryDocument, MemoryEngine};
//! use highlight_oxide::highlight::{HighlightDefinition, Rgb};
//! use highlight_oxide::search::TermId;
//! use highlight_oxide::HighlightSession;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let document = MemoryDocument::from_text_pages(&["An important report"]);
//! let mut session = HighlightSession::with_engine(MemoryEngine::with_document(document));
//!
//! let report = session.search_and_highlight(vec![
//!     (TermId::from("1"), HighlightDefinition::new("im", Rgb::new(255, 0, 0))),
//!     (TermId::from("2"), HighlightDefinition::new("po", Rgb::new(0, 255, 0)).with_regex(true)),
//! ])?;
//! assert_eq!(report.added.len(), 3);
//! # Ok(())
//! # }
//! ```
//!
//! ## License
//!
//! Licensed under either of:
//!
//! * Apache License, Version 2.0 ([LICENSE-APACHE](LICENSE-APACHE) or <http://www.apache.org/licenses/LICENSE-2.0>)
//! * MIT license ([LICENSE-MIT](LICENSE-MIT) or <http://opensource.org/licenses/MIT>)
//!
//! at your option.

#![warn(missing_docs)]

// Error handling
pub mod error;

// Geometry
pub mod geometry;

// Engine boundary
pub mod engine;

// Search orchestration
pub mod search;

// Annotations
pub mod annotations;
pub mod highlight;
pub mod sync;

// Pipeline facade
pub mod session;

// Configuration
pub mod config;

// Re-exports
pub use annotations::{Annotation, AnnotationColor, AnnotationId, HighlightAnnotation};
pub use config::ViewerConfig;
pub use error::{Error, Result};
pub use session::HighlightSession;

// Version info
/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
