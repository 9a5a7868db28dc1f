//! # android_acquisition
//!
//! Lifecycle of a forensic acquisition session against a connected Android
//! device, with a hash manifest establishing chain of custody for everything
//! collected.
//!
//! ## Overview
//!
//! A session allocates a unique id, connects to the device, stages a local
//! evidence directory named after the id, provisions a collector on the
//! device, and finally records what was gathered:
//!
//! - `hashes.csv`: one `path,sha256` row per evidence file
//! - `acquisition.json`: snapshot of the session metadata
//! - `command.log`: the session log
//!
//! ## Usage
//!
//! ```no_run
//! use android_acquisition::acquisition::{Acquisition, SessionContext};
//! use android_acquisition::config::AcquisitionConfig;
//! use android_acquisition::device::adb::AdbBootstrap;
//! use std::path::Path;
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = AcquisitionConfig::from_yaml_file(Path::new("acquisition.yaml"))?;
//! let bootstrap = AdbBootstrap::from_config(&config);
//!
//! let mut acquisition = Acquisition::new(&bootstrap, SessionContext::new(config))?;
//! acquisition.initialize()?;
//! let hashes = acquisition.hash_files()?;
//! acquisition.complete();
//! acquisition.store_info()?;
//!
//! println!("Hashed {} files", hashes.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`acquisition`]: Session lifecycle, staging and metadata
//! - [`device`]: Device adapter traits, system probe, adb adapter
//! - [`utils`]: Hashing and manifest generation
//! - [`config`]: Session configuration
//! - [`logging`]: Injected session logger
//! - [`assets`]: Asset cache cleanup
//! - [`errors`]: Error taxonomy
//! - [`models`]: Serializable data models
//! - [`constants`]: File names, commands and fallbacks

/// Session lifecycle controller, staging and metadata persistence
pub mod acquisition;

/// Cleanup of locally extracted assets
pub mod assets;

/// Configuration loading and defaults
pub mod config;

/// Application constants
pub mod constants;

/// Device bootstrap and collector interfaces
pub mod device;

/// Error types returned by session operations
pub mod errors;

/// Leveled session logging with an optional file sink
pub mod logging;

/// Core data models
pub mod models;

/// Hashing and manifest utilities
pub mod utils;

/// Test utilities and helpers
#[cfg(test)]
pub mod test_utils;

pub use acquisition::{Acquisition, SessionContext};
pub use errors::{AcquisitionError, InitializeStep};
pub use models::{AcquisitionRecord, CollectorInfo, HashRecord};
