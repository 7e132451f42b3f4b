//! # Mapping File
//!
//! `linkset.toml` declares the database location and the relationship fields
//! the CLI may operate on.
//!
//! ```toml
//! database = "linkset.redb"
//!
//! [[field]]
//! owner = "Person"
//! name = "friends"
//! edge_type = "KNOWS"
//! target = "Person"
//! policy = { load = "eager", depth = 2 }
//! ```

use linkset_core::{FieldDecl, LinksetError};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Database used when neither the flag nor the mapping file names one.
pub const DEFAULT_DATABASE: &str = "linkset.redb";

/// Parsed mapping file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Path to the redb database.
    #[serde(default)]
    pub database: Option<PathBuf>,

    /// Declared relationship fields.
    #[serde(default, rename = "field")]
    pub fields: Vec<FieldDecl>,
}

impl AppConfig {
    /// Load the mapping file. A missing file yields an empty configuration.
    pub fn load(path: &Path) -> Result<Self, LinksetError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no mapping file; using defaults");
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path).map_err(|e| {
            LinksetError::IoError(format!("Cannot read '{}': {}", path.display(), e))
        })?;
        let config = Self::parse(&text)?;
        tracing::debug!(
            path = %path.display(),
            fields = config.fields.len(),
            "loaded mapping file"
        );
        Ok(config)
    }

    /// Parse mapping file contents.
    pub fn parse(text: &str) -> Result<Self, LinksetError> {
        toml::from_str(text).map_err(|e| LinksetError::ConfigError(e.to_string()))
    }

    /// Database path: the flag wins over the file, the file over the default.
    #[must_use]
    pub fn database(&self, flag: Option<&Path>) -> PathBuf {
        flag.map(Path::to_path_buf)
            .or_else(|| self.database.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE))
    }
}

// =============================================================================
// TESTS
// =============================================================================
