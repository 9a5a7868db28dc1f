use anyhow::{Context, Result};

use crate::constants::{CPU_ABI_COMMAND, DEFAULT_REMOTE_TMP_DIR, ENVIRONMENT_COMMAND, TMPDIR_PREFIX};
use crate::device::DeviceAdapter;
use crate::logging::AcquisitionLogger;

/// What the session needs to know about the device before provisioning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemInformation {
    pub cpu: String,
    pub tmp_dir: String,
}

/// Query the device for its CPU ABI and remote temp directory.
pub fn probe_system_information(
    adapter: &dyn DeviceAdapter,
    logger: &dyn AcquisitionLogger,
) -> Result<SystemInformation> {
    let cpu = adapter
        .run_shell(CPU_ABI_COMMAND)
        .context(format!("Failed to run `{}`", CPU_ABI_COMMAND))?;
    logger.debug(format_args!("CPU architecture: {}", cpu));

    let environment = adapter
        .run_shell(ENVIRONMENT_COMMAND)
        .context(format!("Failed to run `{}`", ENVIRONMENT_COMMAND))?;
    let tmp_dir = parse_tmp_dir(&environment);
    logger.debug(format_args!("Found temp folder: {}", tmp_dir));

    Ok(SystemInformation { cpu, tmp_dir })
}

/// Pick the remote temp directory out of an `env` dump.
///
/// Only the first `TMPDIR=` line counts; no such line, or an empty value,
/// falls back to `/data/local/tmp`.
pub fn parse_tmp_dir(environment: &str) -> String {
    environment
        .split(|c: char| c == '\n' || c == '\r')
        .map(str::trim)
        .find_map(|line| line.strip_prefix(TMPDIR_PREFIX))
        .filter(|value| !value.is_empty())
        .unwrap_or(DEFAULT_REMOTE_TMP_DIR)
        .to_string()
}
