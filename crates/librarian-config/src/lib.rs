//! # Librarian Configuration
//!
//! Typed configuration for the librarian watch pipeline: where the library
//! lives inside the vault, how long a bulk window stays open, and how loud
//! the pipeline logs.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use librarian_config::{ConfigLoader, SharedSettings};
//!
//! let config = ConfigLoader::load_from_file("librarian.toml")?;
//! let settings = SharedSettings::new(config);
//! assert!(!settings.snapshot().library.root.is_empty());
//! # Ok::<(), librarian_config::ConfigError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod config;
mod error;
mod loader;
mod shared;

pub use config::*;
pub use error::*;
pub use loader::*;
pub use shared::*;
