//! Error taxonomy for acquisition sessions.
//!
//! Collaborators (device adapter, collector, logger, asset cache) report
//! failures as `anyhow::Error`; the session API converts them into the typed
//! [`AcquisitionError`] so callers can tell which phase failed.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Boxed error carried as the source of a wrapped failure.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Ordered sub-steps of `Acquisition::initialize`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitializeStep {
    SystemInformation,
    CollectorProvisioning,
    StagingDirectories,
    FileLogging,
}

impl fmt::Display for InitializeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InitializeStep::SystemInformation => "system information",
            InitializeStep::CollectorProvisioning => "collector provisioning",
            InitializeStep::StagingDirectories => "staging directories",
            InitializeStep::FileLogging => "file logging",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum AcquisitionError {
    /// No device answered, or the adapter itself could not be bootstrapped.
    #[error("failed to initialize device connection: {source}")]
    Initialization {
        #[source]
        source: BoxError,
    },

    /// One of the ordered initialization steps failed.
    #[error("initialization step '{step}' failed: {source}")]
    StepFailure {
        step: InitializeStep,
        #[source]
        source: BoxError,
    },

    #[error("acquisition is already initialized")]
    AlreadyInitialized,

    /// An operation needing the storage path ran before staging.
    #[error("acquisition storage has not been staged")]
    NotStaged,

    #[error("I/O failure at '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Traversal or digest failure while building the manifest.
    #[error("failed to hash '{}': {source}", .path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Manifest generation failed and the partial manifest could not be
    /// removed either.
    #[error(
        "{cause}; partial manifest '{}' could not be removed: {source}",
        .path.display()
    )]
    ManifestCleanup {
        path: PathBuf,
        cause: Box<AcquisitionError>,
        #[source]
        source: io::Error,
    },

    /// Output names must be a single plain file name that is not one of the
    /// session's own artifacts.
    #[error("invalid output file name '{name}'")]
    InvalidOutputName { name: String },

    #[error("failed to encode acquisition snapshot: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AcquisitionError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        AcquisitionError::Io { path: path.into(), source }
    }

    pub(crate) fn step<E: Into<BoxError>>(step: InitializeStep) -> impl FnOnce(E) -> Self {
        move |err| AcquisitionError::StepFailure { step, source: err.into() }
    }

    /// The failing initialization step, if this is a step failure.
    pub fn failed_step(&self) -> Option<InitializeStep> {
        match self {
            AcquisitionError::StepFailure { step, .. } => Some(*step),
            _ => None,
        }
    }
}
