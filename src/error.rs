//! Error types for the highlight pipeline.
//!
//! This module defines all error types that can occur while driving the
//! document engine, aggregating results and syncing annotations.

/// Result type alias for highlight pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during a search and highlight cycle.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Operation attempted before the engine was initialized
    #[error("Document engine is not ready")]
    EngineNotReady,

    /// Engine initialization failed (fatal for the whole pipeline)
    #[error("Engine initialization failed: {0}")]
    EngineInit(String),

    /// Generic engine fault outside a search pass
    #[error("Engine error: {0}")]
    Engine(String),

    /// A single match could not be turned into geometry (reported, not fatal)
    #[error("Bad match geometry for term '{term_id}' on page {page_number}: {reason}")]
    MatchGeometry {
        /// Term whose pass produced the match
        term_id: String,
        /// Reported page number (0 when unknown)
        page_number: u32,
        /// Reason reported by the engine or the validator
        reason: String,
    },

    /// A run was requested while another one is still in flight
    #[error("A search run is already in progress")]
    RunInProgress,

    /// Results were read before the run published them
    #[error("Search run has not completed")]
    RunNotComplete,

    /// The engine dropped its callbacks before signalling document end
    #[error("Engine stopped reporting before document end for term '{term_id}'")]
    EngineDisconnected {
        /// Term whose pass was abandoned
        term_id: String,
    },

    /// Two definitions share a term id within one run
    #[error("Duplicate term id: {0}")]
    DuplicateTermId(String),

    /// Highlight definition failed validation
    #[error("Invalid highlight definition '{term_id}': {reason}")]
    InvalidDefinition {
        /// Offending term id
        term_id: String,
        /// Validation failure
        reason: String,
    },

    /// Search pattern could not be compiled
    #[error("Invalid search pattern: {0}")]
    InvalidPattern(String),

    /// Annotation id not tracked by the annotation layer
    #[error("Unknown annotation id: {0}")]
    UnknownAnnotation(u64),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether this error is isolated to a single match and must not abort a pass.
    pub fn is_per_match(&self) -> bool {
        matches!(self, Self::MatchGeometry { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_geometry_error() {
        let err = Error::MatchGeometry {
            term_id: "1".to_string(),
            page_number: 3,
            reason: "non-finite coordinate".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("'1'"));
        assert!(msg.contains("page 3"));
        assert!(msg.contains("non-finite"));
        assert!(err.is_per_match());
    }

    #[test]
    fn test_engine_not_ready_error() {
        let err = Error::EngineNotReady;
        assert_eq!(format!("{}", err), "Document engine is not ready");
        assert!(!err.is_per_match());
    }

    #[test]
    fn test_duplicate_term_id_error() {
        let err = Error::DuplicateTermId("2".to_string());
        assert!(format!("{}", err).contains("Duplicate term id: 2"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.json");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(format!("{}", err).contains("missing.json"));
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}
