//! Error types for configuration loading and validation.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// IO error while reading a config file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The file content could not be parsed.
    #[error("Failed to parse {}: {message}", path.display())]
    Parse {
        /// File that failed to parse.
        path: PathBuf,
        /// Parser message.
        message: String,
    },

    /// The file extension does not map to a supported format.
    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),

    /// A field holds a value that fails validation.
    #[error("Invalid value for {field}: {value}")]
    InvalidValue {
        /// Dotted field name.
        field: String,
        /// Description of the offending value.
        value: String,
    },
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
