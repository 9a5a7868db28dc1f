//! Acquisition session lifecycle.
//!
//! An [`Acquisition`] moves through `new → initialize → (collection) →
//! complete`. Between `initialize` and `complete` the caller drives the
//! collector, then records the evidence with [`Acquisition::hash_files`] and
//! [`Acquisition::store_info`].
//!
//! ```no_run
//! use android_acquisition::acquisition::{Acquisition, SessionContext};
//! use android_acquisition::config::AcquisitionConfig;
//! use android_acquisition::device::adb::AdbBootstrap;
//!
//! # fn example() -> anyhow::Result<()> {
//! let config = AcquisitionConfig::with_base_path("/cases/2024-117");
//! let bootstrap = AdbBootstrap::from_config(&config);
//!
//! let mut acquisition = Acquisition::new(&bootstrap, SessionContext::new(config))?;
//! acquisition.initialize()?;
//! // ... run collection modules against acquisition.adapter() ...
//! acquisition.hash_files()?;
//! acquisition.complete();
//! acquisition.store_info()?;
//! # Ok(())
//! # }
//! ```

mod lifecycle;
pub mod metadata;
pub mod staging;

pub use lifecycle::{Acquisition, SessionContext};
pub use staging::{create_staging_directories, StagingLayout};
