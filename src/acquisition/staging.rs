use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::{APKS_DIR_NAME, LOGS_DIR_NAME};
use crate::errors::AcquisitionError;

/// Local evidence directories of one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagingLayout {
    pub storage_path: PathBuf,
    pub apks_path: PathBuf,
    pub logs_path: PathBuf,
}

/// Create `<base_path>/<session_id>` and its `apks` and `logs` children, in
/// that order.
///
/// Nothing is merged or retried: an existing storage path is an error. Every
/// directory is pushed onto `created` as soon as it exists, so a caller can
/// undo a partial staging.
pub fn create_staging_directories(
    base_path: &Path,
    session_id: &str,
    created: &mut Vec<PathBuf>,
) -> Result<StagingLayout, AcquisitionError> {
    let base_path = absolute(base_path)?;

    let storage_path = base_path.join(session_id);
    make_dir(&storage_path, created)?;

    let apks_path = storage_path.join(APKS_DIR_NAME);
    make_dir(&apks_path, created)?;

    let logs_path = storage_path.join(LOGS_DIR_NAME);
    make_dir(&logs_path, created)?;

    Ok(StagingLayout {
        storage_path,
        apks_path,
        logs_path,
    })
}

fn absolute(path: &Path) -> Result<PathBuf, AcquisitionError> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .map_err(|e| AcquisitionError::io(path, e))
}

fn make_dir(path: &Path, created: &mut Vec<PathBuf>) -> Result<(), AcquisitionError> {
    fs::create_dir(path).map_err(|e| AcquisitionError::io(path, e))?;
    created.push(path.to_path_buf());
    Ok(())
}
