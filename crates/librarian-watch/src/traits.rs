//! Seams to the host: where raw changes come from and where the library root
//! is configured.

use crate::error::Result;
use crate::events::RawChange;
use crate::split_path::SplitPath;
use librarian_config::{LibraryConfig, SharedSettings};
use std::sync::Arc;
use tracing::warn;

/// Callback receiving raw host notifications.
pub type RawChangeListener = Arc<dyn Fn(RawChange) + Send + Sync>;

/// A host file-watching mechanism delivering `onCreate`/`onRename`/`onDelete`.
pub trait VaultEventSource: Send + Sync {
    /// Get the source type identifier.
    fn name(&self) -> &'static str;

    /// Register a listener; it stays registered until the returned
    /// subscription is cancelled or dropped.
    fn subscribe(&self, listener: RawChangeListener) -> Result<SourceSubscription>;
}

/// Registration of a listener with a [`VaultEventSource`].
///
/// Cancelling or dropping it unregisters the listener.
pub struct SourceSubscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl SourceSubscription {
    /// Subscription that runs `cancel` once when it ends.
    pub fn new<F>(cancel: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Unregister the listener now.
    pub fn cancel(mut self) {
        self.run_cancel();
    }

    fn run_cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for SourceSubscription {
    fn drop(&mut self) {
        self.run_cancel();
    }
}

impl std::fmt::Debug for SourceSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceSubscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

/// Settings collaborator that knows the library root.
///
/// Read once per window so root changes take effect on the next window.
pub trait LibraryRootProvider: Send + Sync {
    /// Current library root folder, vault-relative.
    fn library_root(&self) -> SplitPath;
}

impl LibraryRootProvider for SplitPath {
    fn library_root(&self) -> SplitPath {
        self.clone()
    }
}

impl LibraryRootProvider for SharedSettings {
    fn library_root(&self) -> SplitPath {
        library_root_from_config(&self.library())
    }
}

impl<T: LibraryRootProvider + ?Sized> LibraryRootProvider for Arc<T> {
    fn library_root(&self) -> SplitPath {
        (**self).library_root()
    }
}

/// Library root folder named by `config`.
///
/// A root naming no folder yields a path no vault entry can lie under, so
/// every event scopes as outside.
pub fn library_root_from_config(config: &LibraryConfig) -> SplitPath {
    let mut segments = config.root_segments();
    match segments.pop() {
        Some(basename) => SplitPath::folder(segments, basename),
        None => {
            warn!("Library root '{}' names no folder; nothing is in scope", config.root);
            SplitPath::folder(Vec::new(), "")
        }
    }
}
