//! Bulk window accumulation.
//!
//! Groups a burst of vault events into one window using two timers: a quiet
//! timer that restarts on every push and a max timer that starts with the
//! window and never restarts. Whichever fires first closes the window.

use crate::error::{Error, Result};
use crate::events::VaultEvent;
use crate::reducer::reduce_roots;
use chrono::{DateTime, Utc};
use librarian_config::WindowConfig;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

/// Callback invoked once per closed window.
pub type BulkHandler = Arc<dyn Fn(BulkVaultEvent) + Send + Sync>;

/// Which timer closed a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowCloseReason {
    /// No event arrived for the quiet period.
    QuietWindow,
    /// The window hit its hard cap.
    MaxWindow,
}

/// Diagnostics for one window. Carries no semantic weight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowDebug {
    /// When the first event was admitted.
    pub started_at: DateTime<Utc>,
    /// When the window closed.
    pub ended_at: DateTime<Utc>,
    /// Events admitted.
    pub raw_count: usize,
    /// Events implied by some root.
    pub collapsed_count: usize,
    /// Roots left after reduction.
    pub root_count: usize,
    /// Timer that closed the window.
    pub close_reason: WindowCloseReason,
}

/// A closed window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkVaultEvent {
    /// Identifier used in logs.
    pub window_id: Uuid,
    /// Every admitted event, in arrival order.
    pub events: Vec<VaultEvent>,
    /// Minimal subset implying all of `events`.
    pub roots: Vec<VaultEvent>,
    /// Diagnostics.
    pub debug: WindowDebug,
}

impl BulkVaultEvent {
    /// Close a window over `events`, computing its roots.
    pub fn close(
        window_id: Uuid,
        events: Vec<VaultEvent>,
        started_at: DateTime<Utc>,
        close_reason: WindowCloseReason,
    ) -> Self {
        let roots = reduce_roots(&events);
        let debug = WindowDebug {
            started_at,
            ended_at: Utc::now(),
            raw_count: events.len(),
            collapsed_count: events.len() - roots.len(),
            root_count: roots.len(),
            close_reason,
        };
        Self {
            window_id,
            events,
            roots,
            debug,
        }
    }
}

struct OpenWindow {
    id: Uuid,
    started_at: DateTime<Utc>,
    events: Vec<VaultEvent>,
    quiet_timer: JoinHandle<()>,
    max_timer: JoinHandle<()>,
}

impl OpenWindow {
    fn abort_timers(&self) {
        self.quiet_timer.abort();
        self.max_timer.abort();
    }
}

#[derive(Default)]
struct AccumulatorState {
    handler: Option<BulkHandler>,
    window: Option<OpenWindow>,
}

/// Debounced batching buffer; at most one window is open at a time.
pub struct WindowAccumulator {
    config: WindowConfig,
    runtime: Handle,
    state: Arc<Mutex<AccumulatorState>>,
}

impl WindowAccumulator {
    /// Create an accumulator whose timers run on the current tokio runtime.
    pub fn new(config: WindowConfig) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|e| Error::NoRuntime(e.to_string()))?;
        Ok(Self::with_runtime(config, runtime))
    }

    /// Create an accumulator whose timers run on `runtime`.
    ///
    /// Use this when events are pushed from threads outside the runtime,
    /// such as a host watcher's callback thread.
    pub fn with_runtime(config: WindowConfig, runtime: Handle) -> Self {
        Self {
            config,
            runtime,
            state: Arc::new(Mutex::new(AccumulatorState::default())),
        }
    }

    /// Window timings in use.
    pub fn config(&self) -> WindowConfig {
        self.config
    }

    /// Register the handler for closed windows, replacing any previous one.
    pub fn set_handler<F>(&self, handler: F)
    where
        F: Fn(BulkVaultEvent) + Send + Sync + 'static,
    {
        self.state.lock().handler = Some(Arc::new(handler));
    }

    /// Unregister the handler. Returns whether one was registered.
    pub fn clear_handler(&self) -> bool {
        self.state.lock().handler.take().is_some()
    }

    /// Whether a handler is registered.
    pub fn has_handler(&self) -> bool {
        self.state.lock().handler.is_some()
    }

    /// Whether a window is currently open.
    pub fn is_open(&self) -> bool {
        self.state.lock().window.is_some()
    }

    /// Events admitted into the open window so far.
    pub fn pending_len(&self) -> usize {
        self.state
            .lock()
            .window
            .as_ref()
            .map_or(0, |window| window.events.len())
    }

    /// Admit an event into the open window, opening one if needed.
    ///
    /// Fails with [`Error::NoHandler`] when no handler is registered; the
    /// event is discarded in that case.
    pub fn push(&self, event: VaultEvent) -> Result<()> {
        let mut state = self.state.lock();
        if state.handler.is_none() {
            warn!("Discarding {}: no window handler registered", event);
            return Err(Error::NoHandler);
        }

        if let Some(window) = state.window.as_mut() {
            window.quiet_timer.abort();
            window.quiet_timer = self.spawn_timer(window.id, WindowCloseReason::QuietWindow);
            trace!(window_id = %window.id, "Admitted {}", event);
            window.events.push(event);
            return Ok(());
        }

        let id = Uuid::new_v4();
        debug!(window_id = %id, "Opening bulk window with {}", event);
        state.window = Some(OpenWindow {
            id,
            started_at: Utc::now(),
            events: vec![event],
            quiet_timer: self.spawn_timer(id, WindowCloseReason::QuietWindow),
            max_timer: self.spawn_timer(id, WindowCloseReason::MaxWindow),
        });
        Ok(())
    }

    /// Drop the open window without invoking the handler.
    ///
    /// Returns the number of discarded events.
    pub fn clear(&self) -> usize {
        let window = self.state.lock().window.take();
        match window {
            Some(window) => {
                window.abort_timers();
                debug!(
                    window_id = %window.id,
                    discarded = window.events.len(),
                    "Cleared bulk window"
                );
                window.events.len()
            }
            None => 0,
        }
    }

    fn spawn_timer(&self, window_id: Uuid, reason: WindowCloseReason) -> JoinHandle<()> {
        let state = Arc::clone(&self.state);
        let delay = match reason {
            WindowCloseReason::QuietWindow => self.config.quiet_window(),
            WindowCloseReason::MaxWindow => self.config.max_window(),
        };
        self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            close_window(&state, window_id, reason);
        })
    }
}

impl Drop for WindowAccumulator {
    fn drop(&mut self) {
        self.clear();
    }
}

impl std::fmt::Debug for WindowAccumulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowAccumulator")
            .field("config", &self.config)
            .field("has_handler", &self.has_handler())
            .field("pending", &self.pending_len())
            .finish()
    }
}

fn close_window(state: &Mutex<AccumulatorState>, window_id: Uuid, reason: WindowCloseReason) {
    let (window, handler) = {
        let mut guard = state.lock();
        // A stale timer from an already-closed window finds a different id here.
        if guard.window.as_ref().map(|window| window.id) != Some(window_id) {
            return;
        }
        let Some(window) = guard.window.take() else {
            return;
        };
        (window, guard.handler.clone())
    };

    match reason {
        WindowCloseReason::QuietWindow => window.max_timer.abort(),
        WindowCloseReason::MaxWindow => window.quiet_timer.abort(),
    }

    let bulk = BulkVaultEvent::close(window.id, window.events, window.started_at, reason);
    info!(
        window_id = %bulk.window_id,
        raw = bulk.debug.raw_count,
        collapsed = bulk.debug.collapsed_count,
        roots = bulk.debug.root_count,
        reason = ?reason,
        "Closed bulk window"
    );

    match handler {
        Some(handler) => handler(bulk),
        None => warn!(
            window_id = %bulk.window_id,
            "Window closed after its handler was removed; dropped {} events",
            bulk.debug.raw_count
        ),
    }
}
