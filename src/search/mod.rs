//! Multi-term search against the document engine.
//!
//! This module provides:
//! - [`SearchMode`] flags and the [`SearchModeResolver`] mapping a highlight
//!   definition to them
//! - [`normalize`], turning engine-native [`RawQuad`]s into canonical quads
//! - [`SequentialSearchDriver`], running one full-document pass per term
//! - [`ResultStore`], where finished passes are committed
//!
//! ## Example
//!
//! ```
//! use highlight_oxide::engine::{MemoryDocument, MemoryEngine};
//! use highlight_oxide::highlight::{HighlightDefinition, Rgb};
//! use highlight_oxide::search::{SequentialSearchDriver, TermId};
//!
//! let mut engine = MemoryEngine::with_document(MemoryDocument::from_text_pages(&["import"]));
//! let mut driver = SequentialSearchDriver::new();
//! let terms = vec![
//!     (TermId::from("1"), HighlightDefinition::new("im", Rgb::new(255, 0, 0))),
//!     (TermId::from("2"), HighlightDefinition::new("po", Rgb::new(0, 255, 0))),
//! ];
//!
//! let store = driver.run(&mut engine, terms)?;
//! assert_eq!(store.len(), 2);
//! # Ok::<(), highlight_oxide::Error>(())
//! ```

mod driver;
mod mode;
mod quad;
mod store;

pub use driver::{RunStatus, SequentialSearchDriver};
pub use mode::{SearchMode, SearchModeResolver};
pub use quad::{normalize, RawQuad};
pub use store::{MatchEntry, ResultStore, TermId, TermResultGroup};
