use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;

use crate::acquisition::{metadata, staging};
use crate::assets::{AssetCache, NoAssetCache};
use crate::config::AcquisitionConfig;
use crate::constants::COMMAND_LOG_FILE;
use crate::device::{probe_system_information, Collector, DeviceAdapter, DeviceBootstrap};
use crate::errors::{AcquisitionError, InitializeStep};
use crate::logging::{AcquisitionLogger, SessionLogger};
use crate::models::{AcquisitionRecord, HashRecord};
use crate::utils::manifest;

/// Services a session is wired with.
#[derive(Clone)]
pub struct SessionContext {
    pub config: AcquisitionConfig,
    pub logger: Arc<dyn AcquisitionLogger>,
    pub assets: Arc<dyn AssetCache>,
}

impl SessionContext {
    /// Context with a [`SessionLogger`] and no asset cache.
    pub fn new(config: AcquisitionConfig) -> Self {
        Self {
            config,
            logger: Arc::new(SessionLogger::new()),
            assets: Arc::new(NoAssetCache),
        }
    }

    pub fn with_logger(mut self, logger: Arc<dyn AcquisitionLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_asset_cache(mut self, assets: Arc<dyn AssetCache>) -> Self {
        self.assets = assets;
        self
    }
}

/// Side effects committed by `initialize`, undone if a later step fails.
#[derive(Default)]
struct InitializeJournal {
    directories: Vec<PathBuf>,
    collector_provisioned: bool,
}

/// One forensic acquisition session against one device.
pub struct Acquisition {
    record: AcquisitionRecord,
    adapter: Box<dyn DeviceAdapter>,
    collector: Option<Box<dyn Collector>>,
    context: SessionContext,
}

impl Acquisition {
    /// Open a session: assign an id and start time, connect to the device and
    /// make sure it answers.
    pub fn new(
        bootstrap: &dyn DeviceBootstrap,
        context: SessionContext,
    ) -> Result<Self, AcquisitionError> {
        let record = AcquisitionRecord::new();
        let logger = &context.logger;

        let adapter = bootstrap.connect().map_err(|e| {
            logger.debug(format_args!("failed to initialize adb: {:#}", e));
            AcquisitionError::Initialization {
                source: e.context("failed to initialize adb").into(),
            }
        })?;

        let state = adapter.query_state().map_err(|e| {
            logger.debug(format_args!("failed to get adb state: {:#}", e));
            AcquisitionError::Initialization {
                source: e
                    .context("failed to get adb state (are you sure a device is connected?)")
                    .into(),
            }
        })?;
        logger.debug(format_args!(
            "Acquisition {} started, device state: {}",
            record.uuid, state
        ));

        Ok(Self {
            record,
            adapter,
            collector: None,
            context,
        })
    }

    /// Probe the device, provision the collector, stage the evidence
    /// directories and start the file log, in that order.
    ///
    /// If a step fails, everything the earlier steps committed is undone and
    /// the failing step is reported.
    pub fn initialize(&mut self) -> Result<(), AcquisitionError> {
        if self.collector.is_some() || self.record.storage_path.is_some() {
            return Err(AcquisitionError::AlreadyInitialized);
        }

        let mut journal = InitializeJournal::default();
        let result = self.run_initialize_steps(&mut journal);
        if let Err(err) = &result {
            self.context
                .logger
                .debug(format_args!("initialization failed: {}", err));
            self.roll_back(journal);
        }
        result
    }

    fn run_initialize_steps(
        &mut self,
        journal: &mut InitializeJournal,
    ) -> Result<(), AcquisitionError> {
        let logger = Arc::clone(&self.context.logger);

        let info = probe_system_information(self.adapter.as_ref(), logger.as_ref())
            .map_err(AcquisitionError::step(InitializeStep::SystemInformation))?;
        self.record.cpu = info.cpu;
        self.record.tmp_dir = info.tmp_dir;

        let collector = self
            .adapter
            .provision_collector(&self.record.tmp_dir, &self.record.cpu)
            .map_err(|e| {
                AcquisitionError::step(InitializeStep::CollectorProvisioning)(
                    e.context("failed to upload collector"),
                )
            })?;
        self.record.collector = Some(collector.info());
        self.collector = Some(collector);
        journal.collector_provisioned = true;

        let base_path = self
            .context
            .config
            .resolve_base_path()
            .map_err(AcquisitionError::step(InitializeStep::StagingDirectories))?;
        let layout = staging::create_staging_directories(
            &base_path,
            &self.record.id(),
            &mut journal.directories,
        )
        .map_err(AcquisitionError::step(InitializeStep::StagingDirectories))?;
        self.record.storage_path = Some(layout.storage_path.clone());
        self.record.apks_path = Some(layout.apks_path);
        self.record.logs_path = Some(layout.logs_path);

        let level = self
            .context
            .config
            .file_log_level_filter()
            .map_err(AcquisitionError::step(InitializeStep::FileLogging))?;
        let log_path = layout.storage_path.join(COMMAND_LOG_FILE);
        logger
            .enable_file_sink(level, &log_path)
            .map_err(AcquisitionError::step(InitializeStep::FileLogging))?;

        logger.info(format_args!(
            "Acquisition {} staged at {}",
            self.record.uuid,
            layout.storage_path.display()
        ));
        Ok(())
    }

    fn roll_back(&mut self, journal: InitializeJournal) {
        let logger = &self.context.logger;

        if journal.collector_provisioned {
            if let Some(collector) = self.collector.take() {
                if let Err(e) = collector.release() {
                    logger.warn(format_args!("failed to release collector: {:#}", e));
                }
            }
            self.record.collector = None;
        }

        for dir in journal.directories.iter().rev() {
            if let Err(e) = fs::remove_dir(dir) {
                logger.warn(format_args!(
                    "failed to remove staged directory {}: {}",
                    dir.display(),
                    e
                ));
            }
        }
        self.record.storage_path = None;
        self.record.apks_path = None;
        self.record.logs_path = None;
    }

    /// Close the session: stamp completion, release the collector and clean
    /// the asset cache. Cleanup failures are logged only.
    ///
    /// Calling it again overwrites the completion time.
    pub fn complete(&mut self) {
        self.record.mark_completed(Utc::now());
        let logger = &self.context.logger;

        if let Some(collector) = self.collector.take() {
            if let Err(e) = collector.release() {
                logger.warn(format_args!("failed to release collector: {:#}", e));
            }
        }

        if let Err(e) = self.context.assets.clean_all() {
            logger.warn(format_args!("failed to clean assets: {:#}", e));
        }
    }

    /// Write `hashes.csv` covering every file currently in the storage path.
    ///
    /// This seals the session: the file log is closed first so `command.log`
    /// is hashed in its final form, and later records only reach the `log`
    /// facade. Call it after collection, before `complete` and `store_info`.
    pub fn hash_files(&self) -> Result<Vec<HashRecord>, AcquisitionError> {
        let storage_path = self.storage_path()?;
        self.context
            .logger
            .info(format_args!("Generating list of files hashes..."));
        self.context.logger.disable_file_sink();

        let records = manifest::write_manifest(storage_path)?;
        self.context
            .logger
            .debug(format_args!("Hashed {} files", records.len()));
        Ok(records)
    }

    /// Write `acquisition.json` with the current session snapshot.
    pub fn store_info(&self) -> Result<PathBuf, AcquisitionError> {
        let storage_path = self.storage_path()?;
        self.context
            .logger
            .info(format_args!("Saving details about acquisition and device..."));

        metadata::store_info(&self.record, storage_path)
    }

    /// Persist command output under the storage path.
    pub fn save_output(&self, file_name: &str, output: &str) -> Result<PathBuf, AcquisitionError> {
        metadata::save_output(self.storage_path()?, file_name, output)
    }

    pub fn record(&self) -> &AcquisitionRecord {
        &self.record
    }

    pub fn id(&self) -> String {
        self.record.id()
    }

    /// The device channel, for collection work between initialize and complete.
    pub fn adapter(&self) -> &dyn DeviceAdapter {
        self.adapter.as_ref()
    }

    pub fn has_collector(&self) -> bool {
        self.collector.is_some()
    }

    fn storage_path(&self) -> Result<&Path, AcquisitionError> {
        self.record
            .storage_path
            .as_deref()
            .ok_or(AcquisitionError::NotStaged)
    }
}
