//! Configuration errors.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for configuration loading.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No configuration file was found in any search location.
    #[error("No configuration file found (searched: {})", display_paths(.searched))]
    NotFound {
        /// Paths that were tried, in order.
        searched: Vec<PathBuf>,
    },

    /// The file exists but could not be read.
    #[error("Failed to read {path:?}: {source}")]
    Io {
        /// File path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file could not be deserialized.
    #[error("Failed to parse {format} configuration: {message}")]
    Parse {
        /// Format that was attempted.
        format: &'static str,
        /// Parser diagnostic.
        message: String,
    },

    /// An environment override holds an unusable value.
    #[error("Invalid value for {var}: {message}")]
    InvalidOverride {
        /// Environment variable name.
        var: String,
        /// What is wrong with it.
        message: String,
    },

    /// The configuration parsed but failed validation.
    #[error("Invalid configuration: {0}")]
    Validation(String),
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
