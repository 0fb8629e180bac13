//! Host event sources.

mod manual;
mod notify_backend;

pub use manual::ManualEventSource;
pub use notify_backend::{NotifyEventSource, NotifyTranslator, RENAME_PAIRING_TIMEOUT};
