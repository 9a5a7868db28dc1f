//! Global constants for the acquisition library.
//!
//! File names, shell commands and fallbacks that make up the on-disk and
//! on-device contract of a session live here.

/// Buffer size used when streaming files through the digest (1MB)
pub const HASH_BUFFER_SIZE: usize = 1024 * 1024;

/// Remote temp directory used when the device environment does not report one
pub const DEFAULT_REMOTE_TMP_DIR: &str = "/data/local/tmp";

/// Prefix of the environment line carrying the remote temp directory
pub const TMPDIR_PREFIX: &str = "TMPDIR=";

// Device shell commands
pub const CPU_ABI_COMMAND: &str = "getprop ro.product.cpu.abi";
pub const ENVIRONMENT_COMMAND: &str = "env";

// Staging layout
pub const APKS_DIR_NAME: &str = "apks";
pub const LOGS_DIR_NAME: &str = "logs";

// Files persisted under the storage path
pub const COMMAND_LOG_FILE: &str = "command.log";
pub const MANIFEST_FILE: &str = "hashes.csv";
pub const METADATA_FILE: &str = "acquisition.json";

/// Name of the collector executable once pushed to the device
pub const REMOTE_COLLECTOR_NAME: &str = "collector";

/// Log target used for every record emitted by this crate
pub const LOG_TARGET: &str = "android_acquisition";
