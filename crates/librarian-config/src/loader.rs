//! Loading configuration files from disk.

use crate::config::LibrarianConfig;
use crate::error::{ConfigError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Supported configuration file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML (`.toml`)
    Toml,
    /// YAML (`.yaml`, `.yml`)
    Yaml,
    /// JSON (`.json`)
    Json,
}

impl ConfigFormat {
    /// Pick a format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "toml" => Ok(Self::Toml),
            "yaml" | "yml" => Ok(Self::Yaml),
            "json" => Ok(Self::Json),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Reads and validates librarian configuration.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load, parse and validate a config file, choosing the format by extension.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<LibrarianConfig> {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path)?;
        debug!("Loading librarian config from {}", path.display());

        let contents = fs::read_to_string(path)?;
        let config = Self::parse(&contents, format, path.to_path_buf())?;
        config.validate()?;

        info!(
            library_root = %config.library.root,
            quiet_window_ms = config.window.quiet_window_ms,
            max_window_ms = config.window.max_window_ms,
            "Loaded librarian config"
        );
        Ok(config)
    }

    /// Load from a file if it exists, falling back to defaults otherwise.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<LibrarianConfig> {
        let path = path.as_ref();
        if path.exists() {
            Self::load_from_file(path)
        } else {
            debug!("No config at {}, using defaults", path.display());
            Ok(LibrarianConfig::default())
        }
    }

    /// Parse and validate config held in memory.
    pub fn load_from_str(contents: &str, format: ConfigFormat) -> Result<LibrarianConfig> {
        let config = Self::parse(contents, format, PathBuf::from("<inline>"))?;
        config.validate()?;
        Ok(config)
    }

    fn parse(contents: &str, format: ConfigFormat, origin: PathBuf) -> Result<LibrarianConfig> {
        match format {
            ConfigFormat::Json => {
                serde_json::from_str(contents).map_err(|e| ConfigError::Parse {
                    path: origin,
                    message: e.to_string(),
                })
            }
            #[cfg(feature = "toml")]
            ConfigFormat::Toml => toml::from_str(contents).map_err(|e| ConfigError::Parse {
                path: origin,
                message: e.to_string(),
            }),
            #[cfg(feature = "yaml")]
            ConfigFormat::Yaml => {
                serde_yaml::from_str(contents).map_err(|e| ConfigError::Parse {
                    path: origin,
                    message: e.to_string(),
                })
            }
            #[allow(unreachable_patterns)]
            other => Err(ConfigError::UnsupportedFormat(format!(
                "{:?} support is not compiled in",
                other
            ))),
        }
    }
}
