//! In-process event source driven by explicit calls.
//!
//! Hosts that already receive `onCreate`/`onRename`/`onDelete` callbacks
//! forward them through [`ManualEventSource::emit`].

use crate::error::Result;
use crate::events::RawChange;
use crate::traits::{RawChangeListener, SourceSubscription, VaultEventSource};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tracing::trace;

type Listeners = Mutex<Vec<(u64, RawChangeListener)>>;

/// Event source that fans explicit [`RawChange`]s out to its listeners.
#[derive(Default)]
pub struct ManualEventSource {
    listeners: Arc<Listeners>,
    next_id: AtomicU64,
}

impl ManualEventSource {
    /// Create a source with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver `change` to every listener. Returns how many received it.
    pub fn emit(&self, change: RawChange) -> usize {
        // Snapshot so listeners may subscribe or cancel while being called.
        let listeners: Vec<RawChangeListener> = self
            .listeners
            .lock()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        trace!(listeners = listeners.len(), "Emitting {:?}", change);
        for listener in &listeners {
            listener(change.clone());
        }
        listeners.len()
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }
}

impl VaultEventSource for ManualEventSource {
    fn name(&self) -> &'static str {
        "manual"
    }

    fn subscribe(&self, listener: RawChangeListener) -> Result<SourceSubscription> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.listeners.lock().push((id, listener));

        let listeners: Weak<Listeners> = Arc::downgrade(&self.listeners);
        Ok(SourceSubscription::new(move || {
            if let Some(listeners) = listeners.upgrade() {
                listeners.lock().retain(|(existing, _)| *existing != id);
            }
        }))
    }
}

impl std::fmt::Debug for ManualEventSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManualEventSource")
            .field("listeners", &self.listener_count())
            .finish()
    }
}
