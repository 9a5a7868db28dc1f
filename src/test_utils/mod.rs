//! Test utilities for the acquisition library
//!
//! Scratch evidence trees plus fakes for the device, collector, logger and
//! asset cache collaborators.

#![cfg(test)]

use anyhow::{anyhow, Result};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::{NamedTempFile, TempDir};

use log::{Level, LevelFilter};

use crate::assets::AssetCache;
use crate::constants::{CPU_ABI_COMMAND, ENVIRONMENT_COMMAND};
use crate::device::{Collector, MockDeviceAdapter};
use crate::logging::AcquisitionLogger;
use crate::models::CollectorInfo;

/// Creates a temporary file with the given content
pub fn create_temp_file(content: &[u8]) -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    use std::io::Write;
    file.write_all(content)?;
    file.flush()?;
    Ok(file)
}

/// Creates an evidence-like tree with five files in nested directories
pub fn create_test_file_structure() -> Result<TempDir> {
    let temp_dir = TempDir::new()?;
    let base_path = temp_dir.path();

    fs::create_dir_all(base_path.join("dir1/subdir1"))?;
    fs::create_dir_all(base_path.join("dir2"))?;

    fs::write(base_path.join("file1.txt"), b"Test content 1")?;
    fs::write(base_path.join("file2.log"), b"Test log content")?;
    fs::write(base_path.join("dir1/file3.txt"), b"Test content 3")?;
    fs::write(base_path.join("dir1/subdir1/file4.txt"), b"Test content 4")?;
    fs::write(base_path.join("dir2/file5.log"), b"Another log file")?;

    Ok(temp_dir)
}

/// Shared count of collector releases.
#[derive(Debug, Clone, Default)]
pub struct ReleaseCounter(Arc<AtomicUsize>);

impl ReleaseCounter {
    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// Collector that only counts how often it is released.
pub struct FakeCollector {
    info: CollectorInfo,
    releases: ReleaseCounter,
    fail_release: bool,
}

impl FakeCollector {
    pub fn new(tmp_dir: &str, releases: ReleaseCounter) -> Self {
        Self {
            info: CollectorInfo {
                exe_path: format!("{}/collector", tmp_dir),
                tmp_dir: tmp_dir.to_string(),
                architecture: "arm64".to_string(),
            },
            releases,
            fail_release: false,
        }
    }

    /// Collector whose release always errors.
    pub fn failing(tmp_dir: &str) -> Self {
        Self {
            fail_release: true,
            ..Self::new(tmp_dir, ReleaseCounter::default())
        }
    }
}

impl Collector for FakeCollector {
    fn info(&self) -> CollectorInfo {
        self.info.clone()
    }

    fn release(self: Box<Self>) -> Result<()> {
        self.releases.0.fetch_add(1, Ordering::SeqCst);
        if self.fail_release {
            return Err(anyhow!("device disconnected"));
        }
        Ok(())
    }
}

/// An arm64 device reporting `/data/local/tmp/acq` as its temp directory.
pub fn scripted_adapter(releases: ReleaseCounter) -> MockDeviceAdapter {
    let mut adapter = MockDeviceAdapter::new();
    adapter
        .expect_query_state()
        .returning(|| Ok("device".to_string()));
    adapter
        .expect_run_shell()
        .withf(|command| command == CPU_ABI_COMMAND)
        .returning(|_| Ok("arm64-v8a".to_string()));
    adapter
        .expect_run_shell()
        .withf(|command| command == ENVIRONMENT_COMMAND)
        .returning(|_| Ok("PATH=/system/bin\r\nTMPDIR=/data/local/tmp/acq\r\n".to_string()));
    adapter
        .expect_provision_collector()
        .returning(move |tmp_dir, _| {
            Ok(Box::new(FakeCollector::new(tmp_dir, releases.clone())) as Box<dyn Collector>)
        });
    adapter
}

/// Asset cache counting cleanups.
#[derive(Debug, Default)]
pub struct CountingAssetCache {
    cleanups: AtomicUsize,
}

impl CountingAssetCache {
    pub fn cleanups(&self) -> usize {
        self.cleanups.load(Ordering::SeqCst)
    }
}

impl AssetCache for CountingAssetCache {
    fn clean_all(&self) -> Result<()> {
        self.cleanups.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Logger keeping every message in memory.
#[derive(Debug, Default)]
pub struct RecordingLogger {
    messages: Mutex<Vec<(Level, String)>>,
    sink: Mutex<Option<PathBuf>>,
    fail_sink: AtomicBool,
}

impl RecordingLogger {
    pub fn contains(&self, needle: &str) -> bool {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .any(|(_, message)| message.contains(needle))
    }

    pub fn sink_path(&self) -> Option<PathBuf> {
        self.sink.lock().unwrap().clone()
    }

    /// Make every later `enable_file_sink` call fail.
    pub fn fail_sink(&self) {
        self.fail_sink.store(true, Ordering::SeqCst);
    }
}

impl AcquisitionLogger for RecordingLogger {
    fn write(&self, level: Level, args: fmt::Arguments<'_>) {
        self.messages.lock().unwrap().push((level, args.to_string()));
    }

    fn enable_file_sink(&self, _level: LevelFilter, path: &Path) -> Result<()> {
        if self.fail_sink.load(Ordering::SeqCst) {
            return Err(anyhow!("log sink unavailable"));
        }
        *self.sink.lock().unwrap() = Some(path.to_path_buf());
        Ok(())
    }

    fn disable_file_sink(&self) {
        *self.sink.lock().unwrap() = None;
    }
}
