//! Device adapter backed by the `adb` executable.

use std::ffi::OsStr;
use std::path::PathBuf;
use std::process::Command;

use anyhow::{anyhow, bail, Context, Result};
use log::debug;

use crate::config::AcquisitionConfig;
use crate::constants::REMOTE_COLLECTOR_NAME;
use crate::device::{Collector, DeviceAdapter, DeviceBootstrap};
use crate::models::CollectorInfo;

/// Map an Android CPU ABI to the suffix of the matching collector binary.
pub fn collector_architecture(cpu_abi: &str) -> Result<&'static str> {
    match cpu_abi.trim() {
        "arm64-v8a" => Ok("arm64"),
        abi if abi.starts_with("armeabi") => Ok("arm"),
        "x86_64" => Ok("amd64"),
        "x86" => Ok("386"),
        other => Err(anyhow!("Unsupported CPU architecture '{}'", other)),
    }
}

#[derive(Debug, Clone)]
struct AdbInvoker {
    adb_path: PathBuf,
    serial: Option<String>,
}

impl AdbInvoker {
    fn run<I, S>(&self, args: I) -> Result<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut command = Command::new(&self.adb_path);
        if let Some(serial) = &self.serial {
            command.arg("-s").arg(serial);
        }
        command.args(args);
        debug!("Running {:?}", command);

        let output = command
            .output()
            .context(format!("Failed to execute {}", self.adb_path.display()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("adb exited with {}: {}", output.status, stderr.trim());
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

/// Starts the adb server and hands out [`AdbDevice`] adapters.
#[derive(Debug, Clone)]
pub struct AdbBootstrap {
    invoker: AdbInvoker,
    collector_assets_dir: Option<PathBuf>,
}

impl AdbBootstrap {
    pub fn new(
        adb_path: impl Into<PathBuf>,
        serial: Option<String>,
        collector_assets_dir: Option<PathBuf>,
    ) -> Self {
        Self {
            invoker: AdbInvoker {
                adb_path: adb_path.into(),
                serial,
            },
            collector_assets_dir,
        }
    }

    pub fn from_config(config: &AcquisitionConfig) -> Self {
        Self::new(
            config.adb_path.clone(),
            config.device_serial.clone(),
            config.collector_assets_dir.clone(),
        )
    }
}

impl DeviceBootstrap for AdbBootstrap {
    fn connect(&self) -> Result<Box<dyn DeviceAdapter>> {
        self.invoker
            .run(["start-server"])
            .context("Failed to start adb server")?;

        Ok(Box::new(AdbDevice {
            invoker: self.invoker.clone(),
            collector_assets_dir: self.collector_assets_dir.clone(),
        }))
    }
}

/// A device reached through `adb`.
#[derive(Debug)]
pub struct AdbDevice {
    invoker: AdbInvoker,
    collector_assets_dir: Option<PathBuf>,
}

impl DeviceAdapter for AdbDevice {
    fn query_state(&self) -> Result<String> {
        let state = self.invoker.run(["get-state"])?;
        if state != "device" {
            bail!("Device is in state '{}'", state);
        }
        Ok(state)
    }

    fn run_shell(&self, command: &str) -> Result<String> {
        self.invoker.run(["shell", command])
    }

    fn provision_collector(&self, tmp_dir: &str, cpu_abi: &str) -> Result<Box<dyn Collector>> {
        let architecture = collector_architecture(cpu_abi)?;
        let assets_dir = self
            .collector_assets_dir
            .as_ref()
            .ok_or_else(|| anyhow!("No collector assets directory configured"))?;

        let local = assets_dir.join(format!("collector_{}", architecture));
        if !local.is_file() {
            bail!("Collector binary not found at {}", local.display());
        }

        let remote = format!("{}/{}", tmp_dir.trim_end_matches('/'), REMOTE_COLLECTOR_NAME);
        self.invoker
            .run([OsStr::new("push"), local.as_os_str(), OsStr::new(&remote)])
            .context("Failed to upload collector")?;
        self.invoker
            .run(["shell", format!("chmod +x {}", remote).as_str()])
            .context("Failed to make collector executable")?;

        Ok(Box::new(AdbCollector {
            invoker: self.invoker.clone(),
            info: CollectorInfo {
                exe_path: remote,
                tmp_dir: tmp_dir.to_string(),
                architecture: architecture.to_string(),
            },
        }))
    }
}

/// Collector binary pushed to the device by [`AdbDevice`].
#[derive(Debug)]
pub struct AdbCollector {
    invoker: AdbInvoker,
    info: CollectorInfo,
}

impl Collector for AdbCollector {
    fn info(&self) -> CollectorInfo {
        self.info.clone()
    }

    fn release(self: Box<Self>) -> Result<()> {
        self.invoker
            .run(["shell", format!("rm -f {}", self.info.exe_path).as_str()])
            .context("Failed to remove collector from device")?;
        Ok(())
    }
}
