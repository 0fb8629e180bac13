//! Shared, swappable settings handle.

use crate::config::{LibrarianConfig, LibraryConfig, WindowConfig};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::debug;

/// Cheaply clonable handle to the live configuration.
///
/// Clones share state, so a settings surface can change the library root
/// while the pipeline keeps reading through its own clone.
#[derive(Debug, Clone, Default)]
pub struct SharedSettings {
    inner: Arc<RwLock<LibrarianConfig>>,
}

impl SharedSettings {
    /// Wrap a configuration.
    pub fn new(config: LibrarianConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    /// Copy of the current configuration.
    pub fn snapshot(&self) -> LibrarianConfig {
        self.inner.read().clone()
    }

    /// Current library settings.
    pub fn library(&self) -> LibraryConfig {
        self.inner.read().library.clone()
    }

    /// Current window timings.
    pub fn window(&self) -> WindowConfig {
        self.inner.read().window
    }

    /// Mutate the configuration in place.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut LibrarianConfig),
    {
        let mut guard = self.inner.write();
        f(&mut guard);
        debug!(library_root = %guard.library.root, "Librarian settings updated");
    }

    /// Replace the whole configuration.
    pub fn replace(&self, config: LibrarianConfig) {
        *self.inner.write() = config;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_observe_updates() {
        let settings = SharedSettings::default();
        let reader = settings.clone();

        settings.update(|config| config.library.root = "Archive/Library".to_string());

        assert_eq!(reader.library().root, "Archive/Library");
        assert_eq!(reader.library().root_segments(), vec!["Archive", "Library"]);
    }

    #[test]
    fn replace_swaps_everything() {
        let settings = SharedSettings::default();
        let mut next = LibrarianConfig::default();
        next.window = WindowConfig::new(100, 400);

        settings.replace(next.clone());

        assert_eq!(settings.snapshot(), next);
        assert_eq!(settings.window().max_window_ms, 400);
    }
}
