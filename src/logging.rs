//! Injected session logger.
//!
//! Components receive an [`AcquisitionLogger`] instead of reaching for a
//! process-wide logger. [`SessionLogger`] forwards everything to the `log`
//! facade and, once a file sink is enabled, mirrors it into `command.log`
//! through a `simplelog::WriteLogger`.

use std::fmt;
use std::fs::File;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use log::{Level, LevelFilter, Log, Record};
use simplelog::{ConfigBuilder, WriteLogger};

use crate::constants::LOG_TARGET;

/// Leveled logger with an optional file destination.
pub trait AcquisitionLogger: Send + Sync {
    fn write(&self, level: Level, args: fmt::Arguments<'_>);

    /// Start mirroring records at or above `level` into the file at `path`.
    fn enable_file_sink(&self, level: LevelFilter, path: &Path) -> Result<()>;

    /// Flush and close the file sink, if any. Later records still reach
    /// every other destination.
    fn disable_file_sink(&self);

    fn debug(&self, args: fmt::Arguments<'_>) {
        self.write(Level::Debug, args);
    }

    fn info(&self, args: fmt::Arguments<'_>) {
        self.write(Level::Info, args);
    }

    fn warn(&self, args: fmt::Arguments<'_>) {
        self.write(Level::Warn, args);
    }
}

/// Default logger: `log` facade plus an optional `simplelog` file sink.
#[derive(Default)]
pub struct SessionLogger {
    file_sink: Mutex<Option<Box<WriteLogger<File>>>>,
}

impl SessionLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a file sink is currently active.
    pub fn has_file_sink(&self) -> bool {
        self.file_sink
            .lock()
            .map(|sink| sink.is_some())
            .unwrap_or(false)
    }
}

impl AcquisitionLogger for SessionLogger {
    fn write(&self, level: Level, args: fmt::Arguments<'_>) {
        log::log!(target: LOG_TARGET, level, "{}", args);

        if let Ok(sink) = self.file_sink.lock() {
            if let Some(sink) = sink.as_ref() {
                sink.log(
                    &Record::builder()
                        .args(args)
                        .level(level)
                        .target(LOG_TARGET)
                        .build(),
                );
            }
        }
    }

    fn enable_file_sink(&self, level: LevelFilter, path: &Path) -> Result<()> {
        let file = File::create(path)
            .context(format!("Failed to create log file at {}", path.display()))?;
        let config = ConfigBuilder::new().set_time_format_rfc3339().build();
        let writer = WriteLogger::new(level, config, file);

        let mut sink = self
            .file_sink
            .lock()
            .map_err(|_| anyhow!("Log sink lock poisoned"))?;
        if let Some(previous) = sink.replace(writer) {
            previous.flush();
        }

        log::debug!(target: LOG_TARGET, "File log enabled at {}", path.display());
        Ok(())
    }

    fn disable_file_sink(&self) {
        if let Ok(mut sink) = self.file_sink.lock() {
            if let Some(previous) = sink.take() {
                previous.flush();
            }
        }
    }
}

impl Drop for SessionLogger {
    fn drop(&mut self) {
        if let Ok(sink) = self.file_sink.get_mut() {
            if let Some(sink) = sink.as_ref() {
                sink.flush();
            }
        }
    }
}
