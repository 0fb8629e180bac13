//! Error types for the librarian watch pipeline.

use thiserror::Error;

/// Errors that can occur while normalizing, batching or sourcing vault events.
#[derive(Error, Debug)]
pub enum Error {
    /// A rename whose two sides disagree on file-vs-folder kind.
    #[error("Malformed rename: '{from}' and '{to}' disagree on file-vs-folder kind")]
    MalformedRename {
        /// Source path as delivered by the host.
        from: String,
        /// Destination path as delivered by the host.
        to: String,
    },

    /// A path that cannot be turned into a structured vault path.
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// An event was pushed while no window handler was registered.
    #[error("No window handler registered; event discarded")]
    NoHandler,

    /// Window timers need a tokio runtime.
    #[error("No tokio runtime available: {0}")]
    NoRuntime(String),

    /// The watcher is already running.
    #[error("Bulk watcher is already running")]
    AlreadyRunning,

    /// The watcher is not running.
    #[error("Bulk watcher is not running")]
    NotRunning,

    /// Host file watching error.
    #[error("File watching error: {0}")]
    Watch(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] librarian_config::ConfigError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for watch pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Convert notify errors to our error type.
impl From<notify::Error> for Error {
    fn from(err: notify::Error) -> Self {
        Error::Watch(err.to_string())
    }
}
