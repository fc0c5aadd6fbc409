//! Resolver configuration
//!
//! Loaded from TOML the same way project manifests are: every key is
//! optional and falls back to [`ResolverConfig::default`].
//!
//! ```toml
//! default_module_name = "main"
//! verify_accessor_shapes = true
//! check_qualified_names = true
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Module name used for mangling when the descriptor records none
pub const DEFAULT_MODULE_NAME: &str = "main";

/// Errors loading a [`ResolverConfig`]
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        /// The file
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The text is not a valid configuration
    #[error("invalid resolver configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Knobs of the [`crate::ElementResolver`]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Module name for mangling when the metadata carries none
    pub default_module_name: String,
    /// Check that methods claimed as accessors have the shape of their role
    pub verify_accessor_shapes: bool,
    /// Check that a class descriptor names its host type
    pub check_qualified_names: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            default_module_name: DEFAULT_MODULE_NAME.to_owned(),
            verify_accessor_shapes: true,
            check_qualified_names: true,
        }
    }
}

impl ResolverConfig {
    /// Parse from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}
