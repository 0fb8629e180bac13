//! # Librarian Bulk Event Pipeline
//!
//! Turns bursts of low-level vault change notifications into a small set of
//! tree actions for the library tree that mirrors a folder of the vault.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────┐    ┌──────────────────┐    ┌─────────────────┐
//! │ VaultEventSource│───▶│ BulkEventWatcher │───▶│WindowAccumulator│
//! │ (notify, manual)│    │   (normalize)    │    │ (quiet + max)   │
//! └─────────────────┘    └──────────────────┘    └─────────────────┘
//!                                                         │
//!                                                         ▼
//! ┌─────────────────┐    ┌──────────────────┐    ┌─────────────────┐
//! │ TreeActionBatch │◀───│TreeActionPlanner │◀───│  reduce_roots   │
//! │   (per window)  │    │ (scope, classify)│    │ (implication)   │
//! └─────────────────┘    └──────────────────┘    └─────────────────┘
//! ```
//!
//! A window closes once no event has arrived for the quiet period, or when
//! its hard cap elapses. Its events are reduced to the roots that imply all
//! the others, scoped against the library root, and turned into at most one
//! tree action per in-library root.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use librarian_config::SharedSettings;
//! use librarian_watch::{LibraryReconciler, NotifyEventSource};
//!
//! # async fn run() -> librarian_watch::Result<()> {
//! let source = Arc::new(NotifyEventSource::new("/path/to/vault"));
//! let reconciler = LibraryReconciler::from_settings(source, SharedSettings::default())?;
//! let subscription = reconciler.start(|batch| {
//!     for action in &batch.actions {
//!         println!("{}: {}", action.as_str(), action.target());
//!     }
//! })?;
//! # subscription.unsubscribe();
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

mod accumulator;
mod actions;
pub mod backends;
pub mod codec;
pub mod error;
mod events;
mod intent;
mod manager;
mod reducer;
mod scope;
mod split_path;
pub mod traits;

pub use accumulator::{
    BulkHandler, BulkVaultEvent, WindowAccumulator, WindowCloseReason, WindowDebug,
};
pub use actions::{
    build_tree_action, build_tree_actions, NodeLocator, SectionLocator, TreeAction,
    TreeActionPlanner, TreeNodeKind,
};
pub use backends::*;
pub use error::*;
pub use events::*;
pub use intent::{classify, classify_event, RenameIntent};
pub use manager::*;
pub use reducer::{implies, reduce_roots};
pub use scope::{scope, unscope, LibraryScope, Scope, ScopedEvent};
pub use split_path::*;
pub use traits::{
    library_root_from_config, LibraryRootProvider, RawChangeListener, SourceSubscription,
    VaultEventSource,
};

/// Re-export common types for convenience
pub mod prelude {
    pub use crate::{
        BulkEventWatcher, BulkVaultEvent, Error, LibraryReconciler, LibraryRootProvider,
        ManualEventSource, NotifyEventSource, RawChange, RawEntry, Result, SplitPath,
        Subscription, TreeAction, TreeActionBatch, VaultEvent, VaultEventSource,
    };
    pub use librarian_config::{LibrarianConfig, SharedSettings, WindowConfig};
}
