//! Device-facing collaborators.
//!
//! The transport to the phone and the collector it runs are external to this
//! crate; the session only talks to them through these traits. [`adb`] has an
//! implementation that drives the `adb` executable.

use anyhow::Result;

use crate::models::CollectorInfo;

pub mod adb;
pub mod probe;

pub use probe::{parse_tmp_dir, probe_system_information, SystemInformation};

/// Establishes the device channel.
#[cfg_attr(test, mockall::automock)]
pub trait DeviceBootstrap {
    fn connect(&self) -> Result<Box<dyn DeviceAdapter>>;
}

/// Blocking command channel to a connected device.
#[cfg_attr(test, mockall::automock)]
pub trait DeviceAdapter {
    /// Report the connection state; an error means no device is reachable.
    fn query_state(&self) -> Result<String>;

    /// Run a shell command on the device and return its standard output.
    fn run_shell(&self, command: &str) -> Result<String>;

    /// Push and prepare the collector binary matching `cpu_abi`.
    fn provision_collector(&self, tmp_dir: &str, cpu_abi: &str) -> Result<Box<dyn Collector>>;
}

/// A collector provisioned on the device.
pub trait Collector {
    fn info(&self) -> CollectorInfo;

    /// Remove the collector from the device. Consumes the handle so it can be
    /// released only once.
    fn release(self: Box<Self>) -> Result<()>;
}
