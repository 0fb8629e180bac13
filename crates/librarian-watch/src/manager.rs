//! Front doors that wire a host event source to the window pipeline.

use crate::{
    accumulator::{BulkVaultEvent, WindowAccumulator, WindowDebug},
    actions::{TreeAction, TreeActionPlanner},
    error::{Error, Result},
    events::{normalize, RawChange},
    split_path::SplitPath,
    traits::{LibraryRootProvider, RawChangeListener, SourceSubscription, VaultEventSource},
};
use librarian_config::{SharedSettings, WindowConfig};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tokio::runtime::Handle;
use tracing::{debug, info, warn};
use uuid::Uuid;

struct WatcherShared {
    source: Arc<dyn VaultEventSource>,
    accumulator: WindowAccumulator,
    subscription: Mutex<Option<SourceSubscription>>,
    running: AtomicBool,
}

impl WatcherShared {
    fn admit(&self, raw: &RawChange) -> Result<()> {
        if !self.running.load(Ordering::SeqCst) {
            return Err(Error::NotRunning);
        }
        let event = normalize(raw)?;
        self.accumulator.push(event)
    }

    fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }

        let subscription = self.subscription.lock().take();
        if let Some(subscription) = subscription {
            subscription.cancel();
        }

        let discarded = self.accumulator.clear();
        self.accumulator.clear_handler();
        info!(
            source = self.source.name(),
            discarded, "Bulk event watcher stopped"
        );
    }
}

/// Subscribes to a host event source and delivers one [`BulkVaultEvent`] per
/// closed window.
///
/// Stopping, or dropping the watcher, discards any open window without
/// delivering it.
pub struct BulkEventWatcher {
    shared: Arc<WatcherShared>,
}

impl BulkEventWatcher {
    /// Create a stopped watcher whose timers run on the current runtime.
    pub fn new(source: Arc<dyn VaultEventSource>, config: WindowConfig) -> Result<Self> {
        let accumulator = WindowAccumulator::new(config)?;
        Ok(Self::with_accumulator(source, accumulator))
    }

    /// Create a stopped watcher whose timers run on `runtime`.
    pub fn with_runtime(
        source: Arc<dyn VaultEventSource>,
        config: WindowConfig,
        runtime: Handle,
    ) -> Self {
        Self::with_accumulator(source, WindowAccumulator::with_runtime(config, runtime))
    }

    fn with_accumulator(source: Arc<dyn VaultEventSource>, accumulator: WindowAccumulator) -> Self {
        Self {
            shared: Arc::new(WatcherShared {
                source,
                accumulator,
                subscription: Mutex::new(None),
                running: AtomicBool::new(false),
            }),
        }
    }

    /// Subscribe to the source and route closed windows to `handler`.
    pub fn start<F>(&self, handler: F) -> Result<Subscription>
    where
        F: Fn(BulkVaultEvent) + Send + Sync + 'static,
    {
        let shared = &self.shared;
        if shared
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(Error::AlreadyRunning);
        }

        shared.accumulator.set_handler(handler);

        let weak: Weak<WatcherShared> = Arc::downgrade(shared);
        let listener: RawChangeListener = Arc::new(move |raw: RawChange| {
            let Some(shared) = weak.upgrade() else {
                return;
            };
            match shared.admit(&raw) {
                Ok(()) => {}
                Err(Error::NotRunning) => debug!("Ignoring {:?} after stop", raw),
                Err(e) => warn!("Dropping host change {:?}: {}", raw, e),
            }
        });

        match shared.source.subscribe(listener) {
            Ok(subscription) => {
                *shared.subscription.lock() = Some(subscription);
            }
            Err(e) => {
                shared.accumulator.clear_handler();
                shared.running.store(false, Ordering::SeqCst);
                return Err(e);
            }
        }

        info!(
            source = shared.source.name(),
            quiet_ms = shared.accumulator.config().quiet_window_ms,
            max_ms = shared.accumulator.config().max_window_ms,
            "Bulk event watcher started"
        );
        Ok(Subscription {
            shared: Arc::downgrade(shared),
        })
    }

    /// Unsubscribe from the source and discard any open window.
    ///
    /// Does nothing when already stopped.
    pub fn stop(&self) {
        self.shared.stop();
    }

    /// Normalize `raw` and add it to the current window.
    ///
    /// Hosts calling in directly get the errors the source listener only logs.
    pub fn admit(&self, raw: &RawChange) -> Result<()> {
        self.shared.admit(raw)
    }

    /// Whether the watcher is subscribed.
    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::SeqCst)
    }

    /// Events in the currently open window.
    pub fn pending_len(&self) -> usize {
        self.shared.accumulator.pending_len()
    }

    /// Window timings in use.
    pub fn window_config(&self) -> WindowConfig {
        self.shared.accumulator.config()
    }

    /// Name of the underlying source.
    pub fn source_name(&self) -> &'static str {
        self.shared.source.name()
    }
}

impl Drop for BulkEventWatcher {
    fn drop(&mut self) {
        self.shared.stop();
    }
}

impl std::fmt::Debug for BulkEventWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BulkEventWatcher")
            .field("source", &self.source_name())
            .field("running", &self.is_running())
            .field("accumulator", &self.shared.accumulator)
            .finish()
    }
}

/// Handle returned by `start`.
///
/// Dropping it leaves the watcher running; call [`Subscription::unsubscribe`]
/// to stop it.
#[must_use = "dropping the subscription does not stop the watcher"]
#[derive(Debug, Clone)]
pub struct Subscription {
    shared: Weak<WatcherShared>,
}

impl Subscription {
    /// Stop the watcher this subscription came from.
    pub fn unsubscribe(self) {
        if let Some(shared) = self.shared.upgrade() {
            shared.stop();
        }
    }

    /// Whether the watcher is still running.
    pub fn is_active(&self) -> bool {
        self.shared
            .upgrade()
            .is_some_and(|shared| shared.running.load(Ordering::SeqCst))
    }
}

/// Tree actions planned for one closed window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeActionBatch {
    /// Window the actions came from.
    pub window_id: Uuid,
    /// Library root the window was scoped against.
    pub library_root: SplitPath,
    /// Actions in root order. May be empty.
    pub actions: Vec<TreeAction>,
    /// Window diagnostics.
    pub debug: WindowDebug,
}

impl TreeActionBatch {
    /// Plan `bulk` against `library_root`.
    pub fn plan(bulk: &BulkVaultEvent, library_root: SplitPath) -> Self {
        Self {
            window_id: bulk.window_id,
            actions: TreeActionPlanner::plan(bulk, &library_root),
            library_root,
            debug: bulk.debug.clone(),
        }
    }

    /// Whether the window produced no actions.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// Runs the whole pipeline: host events in, one [`TreeActionBatch`] out per
/// window.
///
/// The library root is read from the provider once per window, so a root
/// change applies from the next window on.
pub struct LibraryReconciler {
    watcher: BulkEventWatcher,
    root_provider: Arc<dyn LibraryRootProvider>,
}

impl LibraryReconciler {
    /// Reconciler over an existing watcher.
    pub fn new(watcher: BulkEventWatcher, root_provider: Arc<dyn LibraryRootProvider>) -> Self {
        Self {
            watcher,
            root_provider,
        }
    }

    /// Reconciler whose window timings and library root come from `settings`.
    ///
    /// Fails with [`Error::Config`] if the settings do not validate.
    pub fn from_settings(source: Arc<dyn VaultEventSource>, settings: SharedSettings) -> Result<Self> {
        settings.snapshot().validate()?;
        let watcher = BulkEventWatcher::new(source, settings.window())?;
        Ok(Self::new(watcher, Arc::new(settings)))
    }

    /// Start watching; `handler` receives every window's batch, empty or not.
    pub fn start<F>(&self, handler: F) -> Result<Subscription>
    where
        F: Fn(TreeActionBatch) + Send + Sync + 'static,
    {
        let root_provider = Arc::clone(&self.root_provider);
        self.watcher.start(move |bulk| {
            let batch = TreeActionBatch::plan(&bulk, root_provider.library_root());
            debug!(
                window_id = %batch.window_id,
                root = %batch.library_root,
                actions = batch.actions.len(),
                "Delivering tree action batch"
            );
            handler(batch);
        })
    }

    /// Stop watching and discard any open window.
    pub fn stop(&self) {
        self.watcher.stop();
    }

    /// Whether the reconciler is running.
    pub fn is_running(&self) -> bool {
        self.watcher.is_running()
    }

    /// Underlying watcher.
    pub fn watcher(&self) -> &BulkEventWatcher {
        &self.watcher
    }
}

impl std::fmt::Debug for LibraryReconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LibraryReconciler")
            .field("watcher", &self.watcher)
            .field("library_root", &self.root_provider.library_root())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::ManualEventSource;
    use crate::events::RawEntry;
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn source() -> Arc<ManualEventSource> {
        Arc::new(ManualEventSource::new())
    }

    #[tokio::test(start_paused = true)]
    async fn start_twice_is_rejected() {
        let source = source();
        let watcher = BulkEventWatcher::new(source.clone(), WindowConfig::default()).unwrap();

        let _subscription = watcher.start(|_| {}).unwrap();
        assert!(matches!(watcher.start(|_| {}), Err(Error::AlreadyRunning)));
        assert_eq!(source.listener_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn admit_requires_running() {
        let watcher = BulkEventWatcher::new(source(), WindowConfig::default()).unwrap();
        let change = RawChange::Created(RawEntry::file("Library/Note.md"));
        assert!(matches!(watcher.admit(&change), Err(Error::NotRunning)));
    }

    #[tokio::test(start_paused = true)]
    async fn emitted_changes_reach_the_handler() {
        let source = source();
        let watcher = BulkEventWatcher::new(source.clone(), WindowConfig::default()).unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let _subscription = watcher
            .start(move |bulk| {
                let _ = tx.send(bulk);
            })
            .unwrap();

        source.emit(RawChange::Created(RawEntry::file("Library/a.md")));
        source.emit(RawChange::Created(RawEntry::file("Library/b.md")));
        assert_eq!(watcher.pending_len(), 2);

        let bulk = rx.recv().await.unwrap();
        assert_eq!(bulk.events.len(), 2);
        assert_eq!(watcher.pending_len(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn unsubscribe_stops_and_discards() {
        let source = source();
        let watcher = BulkEventWatcher::new(source.clone(), WindowConfig::default()).unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel::<BulkVaultEvent>();
        let subscription = watcher
            .start(move |bulk| {
                let _ = tx.send(bulk);
            })
            .unwrap();

        source.emit(RawChange::Created(RawEntry::file("Library/a.md")));
        assert!(subscription.is_active());
        subscription.unsubscribe();

        assert!(!watcher.is_running());
        assert_eq!(source.listener_count(), 0);
        assert_eq!(source.emit(RawChange::Created(RawEntry::file("Library/b.md"))), 0);

        tokio::time::sleep(Duration::from_secs(5)).await;
        // The handler was dropped with the accumulator's registration.
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn watcher_can_restart_after_stop() {
        let source = source();
        let watcher = BulkEventWatcher::new(source.clone(), WindowConfig::default()).unwrap();
        watcher.start(|_| {}).unwrap().unsubscribe();
        watcher.stop();

        let (tx, mut rx) = mpsc::unbounded_channel();
        let _subscription = watcher
            .start(move |bulk: BulkVaultEvent| {
                let _ = tx.send(bulk.events.len());
            })
            .unwrap();
        source.emit(RawChange::Deleted(RawEntry::folder("Library/a")));
        assert_eq!(rx.recv().await, Some(1));
    }

    #[tokio::test(start_paused = true)]
    async fn reconciler_delivers_empty_batches() {
        let source = source();
        let reconciler =
            LibraryReconciler::from_settings(source.clone(), SharedSettings::default()).unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let _subscription = reconciler
            .start(move |batch| {
                let _ = tx.send(batch);
            })
            .unwrap();

        source.emit(RawChange::Created(RawEntry::file("Elsewhere/Note.md")));
        let batch = rx.recv().await.unwrap();
        assert!(batch.is_empty());
        assert_eq!(batch.library_root, SplitPath::folder(vec![], "Library"));
        assert_eq!(batch.debug.raw_count, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn reconciler_rejects_invalid_settings() {
        let settings = SharedSettings::default();
        settings.update(|config| config.window = WindowConfig::new(500, 100));
        let result = LibraryReconciler::from_settings(source(), settings);
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
