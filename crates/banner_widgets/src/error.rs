//! Widget error types

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while configuring widgets
///
/// Runtime widget operations never fail: degenerate input (empty image
/// lists, out-of-range indices, ticks against a detached page) is a silent
/// no-op. Only configuration is fallible.
#[derive(Error, Debug)]
pub enum WidgetError {
    /// Config file could not be read
    #[error("Failed to read config {path}: {source}")]
    Io {
        /// Path that was being read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Config text is not valid TOML for the expected shape
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A config value is out of range
    #[error("Invalid config value for `{field}`: {reason}")]
    InvalidConfig {
        /// Dotted path of the offending field
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },
}

/// Result type for widget operations
pub type Result<T> = std::result::Result<T, WidgetError>;
