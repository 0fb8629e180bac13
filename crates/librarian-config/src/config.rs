//! Configuration schema for the librarian pipeline.

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default vault-relative library root.
pub const DEFAULT_LIBRARY_ROOT: &str = "Library";

/// Default quiet period that closes a bulk window.
pub const DEFAULT_QUIET_WINDOW_MS: u64 = 250;

/// Default hard cap on how long a bulk window may stay open.
pub const DEFAULT_MAX_WINDOW_MS: u64 = 2000;

/// Top-level librarian configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibrarianConfig {
    /// Library subtree settings
    pub library: LibraryConfig,
    /// Bulk window timings
    pub window: WindowConfig,
    /// Logging settings
    pub logging: LoggingConfig,
}

impl LibrarianConfig {
    /// Check every section, returning the first offending field.
    pub fn validate(&self) -> Result<()> {
        self.library.validate()?;
        self.window.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Where the library lives inside the vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// Vault-relative, `/`-separated path of the library root folder.
    pub root: String,
}

impl LibraryConfig {
    /// Create a library config rooted at `root`.
    pub fn new(root: impl Into<String>) -> Self {
        Self { root: root.into() }
    }

    /// Folder names from the vault root down to (and including) the library root.
    pub fn root_segments(&self) -> Vec<String> {
        self.root
            .split(['/', '\\'])
            .filter(|segment| !segment.is_empty() && *segment != ".")
            .map(str::to_string)
            .collect()
    }

    fn validate(&self) -> Result<()> {
        let segments = self.root_segments();
        if segments.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "library.root".to_string(),
                value: format!("'{}' names no folder", self.root),
            });
        }
        if segments.iter().any(|segment| segment == "..") {
            return Err(ConfigError::InvalidValue {
                field: "library.root".to_string(),
                value: format!("'{}' escapes the vault", self.root),
            });
        }
        Ok(())
    }
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self::new(DEFAULT_LIBRARY_ROOT)
    }
}

/// Bulk window timings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Quiet period in milliseconds; restarts on every admitted event
    pub quiet_window_ms: u64,
    /// Hard cap in milliseconds; starts on the first event of a window
    pub max_window_ms: u64,
}

impl WindowConfig {
    /// Create a window config from millisecond values.
    pub fn new(quiet_window_ms: u64, max_window_ms: u64) -> Self {
        Self {
            quiet_window_ms,
            max_window_ms,
        }
    }

    /// Quiet period as a `Duration`.
    pub fn quiet_window(&self) -> Duration {
        Duration::from_millis(self.quiet_window_ms)
    }

    /// Hard cap as a `Duration`.
    pub fn max_window(&self) -> Duration {
        Duration::from_millis(self.max_window_ms)
    }

    fn validate(&self) -> Result<()> {
        if self.quiet_window_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "window.quiet_window_ms".to_string(),
                value: "must be greater than zero".to_string(),
            });
        }
        if self.max_window_ms < self.quiet_window_ms {
            return Err(ConfigError::InvalidValue {
                field: "window.max_window_ms".to_string(),
                value: format!(
                    "{} is shorter than the quiet window ({})",
                    self.max_window_ms, self.quiet_window_ms
                ),
            });
        }
        Ok(())
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self::new(DEFAULT_QUIET_WINDOW_MS, DEFAULT_MAX_WINDOW_MS)
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Level for the librarian crates (`error`, `warn`, `info`, `debug`, `trace`)
    pub level: String,
    /// Emit per-window reduction diagnostics at `debug`
    pub log_window_debug: bool,
}

impl LoggingConfig {
    const LEVELS: [&'static str; 5] = ["error", "warn", "info", "debug", "trace"];

    /// Directive string suitable for `tracing_subscriber::EnvFilter::new`.
    pub fn env_filter_directive(&self) -> String {
        let level = self.level.to_ascii_lowercase();
        let verbosity = |name: &str| Self::LEVELS.iter().position(|known| *known == name);
        // The window diagnostics never make the accumulator quieter than the rest.
        let window_level = if self.log_window_debug && verbosity(&level) < verbosity("debug") {
            "debug"
        } else {
            level.as_str()
        };
        format!(
            "librarian_config={level},librarian_watch={level},librarian_watch::accumulator={window_level}"
        )
    }

    fn validate(&self) -> Result<()> {
        let level = self.level.to_ascii_lowercase();
        if !Self::LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "logging.level".to_string(),
                value: format!("unknown level '{}'", self.level),
            });
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_window_debug: false,
        }
    }
}
