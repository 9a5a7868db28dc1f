use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Serializable snapshot of an acquisition session.
///
/// This is what ends up in `acquisition.json`. The live device handle and the
/// collector handle are kept by `Acquisition` and never serialized.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AcquisitionRecord {
    pub uuid: Uuid,
    pub started: DateTime<Utc>,
    pub completed: Option<DateTime<Utc>>,
    pub storage_path: Option<PathBuf>,
    pub apks_path: Option<PathBuf>,
    pub logs_path: Option<PathBuf>,
    pub cpu: String,
    pub tmp_dir: String,
    pub collector: Option<CollectorInfo>,
}

impl AcquisitionRecord {
    /// Start a new session record with a fresh v4 id.
    pub fn new() -> Self {
        Self {
            uuid: Uuid::new_v4(),
            started: Utc::now(),
            completed: None,
            storage_path: None,
            apks_path: None,
            logs_path: None,
            cpu: String::new(),
            tmp_dir: String::new(),
            collector: None,
        }
    }

    pub fn id(&self) -> String {
        self.uuid.to_string()
    }

    /// Mark the session completed. The stored timestamp never precedes `started`.
    pub fn mark_completed(&mut self, now: DateTime<Utc>) {
        self.completed = Some(now.max(self.started));
    }
}

impl Default for AcquisitionRecord {
    fn default() -> Self {
        Self::new()
    }
}

/// Descriptor of a collector provisioned on the device.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CollectorInfo {
    pub exe_path: String,
    pub tmp_dir: String,
    pub architecture: String,
}

/// One manifest row: an evidence file and its SHA-256 digest.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct HashRecord {
    pub path: PathBuf,
    pub sha256: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_new_records_have_unique_ids() {
        let first = AcquisitionRecord::new();
        let second = AcquisitionRecord::new();

        assert_ne!(first.uuid, second.uuid);
        assert_eq!(first.uuid.get_version_num(), 4);
        assert!(!first.id().is_empty());
        assert!(first.completed.is_none());
    }

    #[test]
    fn test_completed_never_precedes_started() {
        let mut record = AcquisitionRecord::new();
        let earlier = record.started - Duration::seconds(30);

        record.mark_completed(earlier);

        assert_eq!(record.completed, Some(record.started));
    }
}
