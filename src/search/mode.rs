//! Search mode flags and the per-term mode resolver.

use crate::error::{Error, Result};
use crate::highlight::HighlightDefinition;
use bitflags::bitflags;

bitflags! {
    /// Search mode bits understood by the document engine.
    ///
    /// The bit layout mirrors the engine's own mode table, so values can be
    /// passed through to the engine unchanged.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SearchMode: u32 {
        /// Bit 1: match letter case exactly
        const CASE_SENSITIVE = 1 << 0;
        /// Bit 2: match whole words only
        const WHOLE_WORD = 1 << 1;
        /// Bit 3: search backwards from the current position
        const SEARCH_UP = 1 << 2;
        /// Bit 4: stop at the end of each page
        const PAGE_STOP = 1 << 3;
        /// Bit 5: include the matched text in each result
        const PROVIDE_SEARCH_TEXT = 1 << 4;
        /// Bit 6: engine-side highlighting of the current match
        const HIGHLIGHT = 1 << 5;
        /// Bit 7: include surrounding text in each result
        const AMBIENT_STRING = 1 << 6;
        /// Bit 8: treat the term as a regular expression
        const REGEX = 1 << 7;
    }
}

impl SearchMode {
    /// The engine's no-option mode as observed on the reference engine (56).
    ///
    /// Only used when the engine cannot report its own default; see
    /// [`DocumentEngine::default_search_mode`](crate::engine::DocumentEngine::default_search_mode).
    pub const LEGACY_DEFAULT: SearchMode = SearchMode::PAGE_STOP
        .union(SearchMode::PROVIDE_SEARCH_TEXT)
        .union(SearchMode::HIGHLIGHT);

    /// Whether the term should be compiled as a regular expression.
    pub fn is_regex(&self) -> bool {
        self.contains(SearchMode::REGEX)
    }

    /// Whether matching is case sensitive.
    pub fn is_case_sensitive(&self) -> bool {
        self.contains(SearchMode::CASE_SENSITIVE)
    }
}

impl Default for SearchMode {
    fn default() -> Self {
        Self::LEGACY_DEFAULT
    }
}

/// Maps a highlight definition's options to an engine search mode.
///
/// The resolver is unbound until it learns the engine's default mode; an
/// unbound resolver refuses to resolve anything.
#[derive(Debug, Clone, Default)]
pub struct SearchModeResolver {
    default_mode: Option<SearchMode>,
}

impl SearchModeResolver {
    /// Create an unbound resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a resolver bound to a known default mode.
    pub fn with_default(default_mode: SearchMode) -> Self {
        Self {
            default_mode: Some(default_mode),
        }
    }

    /// Bind to the default mode reported by an initialized engine.
    pub fn bind(&mut self, default_mode: SearchMode) {
        if default_mode != SearchMode::LEGACY_DEFAULT {
            log::debug!(
                "engine default search mode {} differs from legacy default {}",
                default_mode.bits(),
                SearchMode::LEGACY_DEFAULT.bits()
            );
        }
        self.default_mode = Some(default_mode);
    }

    /// Whether [`bind`](Self::bind) has been called.
    pub fn is_bound(&self) -> bool {
        self.default_mode.is_some()
    }

    /// Resolve the mode for one definition.
    ///
    /// Regex and case sensitivity combine as a bitwise union; with neither
    /// option the engine default is returned unchanged.
    pub fn resolve(&self, definition: &HighlightDefinition) -> Result<SearchMode> {
        let default_mode = self.default_mode.ok_or(Error::EngineNotReady)?;

        let mode = match (definition.use_regex, definition.case_sensitive) {
            (true, true) => SearchMode::REGEX | SearchMode::CASE_SENSITIVE,
            (true, false) => SearchMode::REGEX,
            (false, true) => SearchMode::CASE_SENSITIVE,
            (false, false) => default_mode,
        };
        Ok(mode)
    }
}
