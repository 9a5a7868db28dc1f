//! Evidence integrity utilities.
//!
//! ## Components
//!
//! - **Hashing**: streaming SHA-256 of a file
//! - **Manifest**: `hashes.csv` generation and re-verification
//!
//! ### Verifying a Session Manifest
//!
//! ```no_run
//! use android_acquisition::utils::manifest::verify_manifest;
//! use std::path::Path;
//!
//! # fn example() -> anyhow::Result<()> {
//! let report = verify_manifest(Path::new("/cases/2024-117/3f2c.../hashes.csv"))?;
//! for failure in report.failures() {
//!     println!("{}: {:?}", failure.record.path.display(), failure.status);
//! }
//! # Ok(())
//! # }
//! ```

/// Cryptographic hash calculation utilities
pub mod hash;

/// Evidence manifest generation and verification
pub mod manifest;
