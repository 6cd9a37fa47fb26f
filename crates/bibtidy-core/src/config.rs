//! Cleanup configuration
//!
//! Loaded from a TOML file with the following structure (every key is
//! optional and falls back to the defaults below):
//!
//! ```toml
//! field_order = ["author", "title", "journal", "year", "volume", "number", "pages", "doi"]
//! remove_enabled = true
//! remove_fields = ["abstract", "eprint", "file", "pmid", "pdf", "mendeley-groups"]
//! comments = "remove"   # or "inline" / "grouped"
//! sort_by_key = false
//!
//! [words]
//! lowercase = ["for", "or", "and", "a", "the", "along", "is"]
//! uppercase = ["DNA", "RNA"]
//! preserve = ["ff19SB"]
//! ```
//!
//! The configuration is validated once, before any processing starts.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::titlecase::WordOverrides;
use bibtidy_bibtex::{CommentPolicy, WriteOptions};

/// Invalid or unreadable configuration; fatal before processing begins
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },

    #[error("field removal is enabled but the removal list is empty")]
    EmptyRemovalList,

    #[error("duplicate field '{0}' in field_order")]
    DuplicateFieldOrder(String),
}

/// All knobs for one cleanup run, threaded through the pipeline as an
/// immutable value
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanupConfig {
    /// Word lists for the title normalizer
    pub words: WordOverrides,
    /// Output order for fields inside an entry; extras follow alphabetically
    pub field_order: Vec<String>,
    pub remove_enabled: bool,
    /// Fields deleted from every entry when removal is enabled
    pub remove_fields: Vec<String>,
    pub comments: CommentPolicy,
    /// Emit entries sorted by cite key instead of input order
    pub sort_by_key: bool,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            words: WordOverrides::default(),
            // ACS ordering
            field_order: [
                "author", "title", "journal", "year", "volume", "number", "pages", "doi",
            ]
            .map(String::from)
            .to_vec(),
            remove_enabled: true,
            remove_fields: ["abstract", "eprint", "file", "pmid", "pdf", "mendeley-groups"]
                .map(String::from)
                .to_vec(),
            comments: CommentPolicy::Remove,
            sort_by_key: false,
        }
    }
}

impl CleanupConfig {
    /// Load a configuration from a TOML file
    pub fn from_toml_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Fail fast on inconsistent settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.remove_enabled && self.remove_fields.is_empty() {
            return Err(ConfigError::EmptyRemovalList);
        }

        let mut seen = Vec::with_capacity(self.field_order.len());
        for name in &self.field_order {
            let lower = name.to_lowercase();
            if seen.contains(&lower) {
                return Err(ConfigError::DuplicateFieldOrder(name.clone()));
            }
            seen.push(lower);
        }

        Ok(())
    }

    /// Serialization options derived from this configuration
    pub fn write_options(&self) -> WriteOptions {
        WriteOptions {
            field_order: self.field_order.clone(),
            comments: self.comments,
            sort_by_key: self.sort_by_key,
        }
    }
}
