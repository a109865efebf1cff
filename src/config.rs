//! Configuration for engine initialization and search runs.

use crate::error::{Error, Result};
use crate::search::SearchMode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Viewer configuration handed to [`DocumentEngine::initialize`](crate::engine::DocumentEngine::initialize).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewerConfig {
    /// Location of the engine's runtime assets.
    pub path: String,

    /// Document to load at startup.
    pub initial_doc: Option<PathBuf>,

    /// License key passed through to the engine.
    pub license_key: Option<String>,

    /// Request full-document passes (one document-end signal per term).
    pub full_search: bool,

    /// Override for the engine's default search mode bits.
    pub default_search_mode: Option<u32>,

    /// Override for the annotation author.
    pub author: Option<String>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewerConfig {
    /// Create new configuration with defaults.
    pub fn new() -> Self {
        Self {
            path: "lib".to_string(),
            initial_doc: None,
            license_key: None,
            full_search: true,
            default_search_mode: None,
            author: None,
        }
    }

    /// Parse configuration from JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&json)
    }

    /// Check field consistency.
    pub fn validate(&self) -> Result<()> {
        if self.path.trim().is_empty() {
            return Err(Error::Config("engine asset path is empty".to_string()));
        }
        if let Some(bits) = self.default_search_mode {
            if SearchMode::from_bits(bits).is_none() {
                return Err(Error::Config(format!("unknown search mode bits in {}", bits)));
            }
        }
        Ok(())
    }

    /// The default search mode override, if any.
    pub fn default_search_mode(&self) -> Option<SearchMode> {
        self.default_search_mode.and_then(SearchMode::from_bits)
    }

    /// Set the document to load.
    pub fn with_initial_doc(mut self, path: impl Into<PathBuf>) -> Self {
        self.initial_doc = Some(path.into());
        self
    }

    /// Set the license key.
    pub fn with_license_key(mut self, key: impl Into<String>) -> Self {
        self.license_key = Some(key.into());
        self
    }

    /// Enable or disable full-document passes.
    pub fn with_full_search(mut self, enable: bool) -> Self {
        self.full_search = enable;
        self
    }

    /// Override the engine default search mode.
    pub fn with_default_search_mode(mut self, mode: SearchMode) -> Self {
        self.default_search_mode = Some(mode.bits());
        self
    }

    /// Override the annotation author.
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }
}
