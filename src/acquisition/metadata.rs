use std::fs::{self, File};
use std::io::Write;
use std::path::{Component, Path, PathBuf};

use crate::constants::{
    APKS_DIR_NAME, COMMAND_LOG_FILE, LOGS_DIR_NAME, MANIFEST_FILE, METADATA_FILE,
};
use crate::errors::AcquisitionError;
use crate::models::AcquisitionRecord;

/// Write `acquisition.json` under `storage_path`.
///
/// The file is created and written in place; there is no
/// write-then-rename step.
pub fn store_info(
    record: &AcquisitionRecord,
    storage_path: &Path,
) -> Result<PathBuf, AcquisitionError> {
    let info = serde_json::to_string_pretty(record)?;
    let info_path = storage_path.join(METADATA_FILE);

    fs::write(&info_path, info).map_err(|e| AcquisitionError::io(&info_path, e))?;

    Ok(info_path)
}

/// Read an `acquisition.json` snapshot back.
pub fn load_info(info_path: &Path) -> Result<AcquisitionRecord, AcquisitionError> {
    let content = fs::read_to_string(info_path).map_err(|e| AcquisitionError::io(info_path, e))?;
    Ok(serde_json::from_str(&content)?)
}

/// Names under the storage path that belong to the session itself.
const RESERVED_NAMES: [&str; 5] = [
    MANIFEST_FILE,
    METADATA_FILE,
    COMMAND_LOG_FILE,
    APKS_DIR_NAME,
    LOGS_DIR_NAME,
];

/// Write command output gathered during the session to `storage_path/file_name`.
///
/// `file_name` must be a single plain file name; separators, `.`/`..` and the
/// session's own artifact names are rejected.
pub fn save_output(
    storage_path: &Path,
    file_name: &str,
    output: &str,
) -> Result<PathBuf, AcquisitionError> {
    validate_output_name(file_name)?;
    let path = storage_path.join(file_name);
    let mut file = File::create(&path).map_err(|e| AcquisitionError::io(&path, e))?;

    file.write_all(output.as_bytes())
        .and_then(|_| file.sync_all())
        .map_err(|e| AcquisitionError::io(&path, e))?;

    Ok(path)
}

fn validate_output_name(file_name: &str) -> Result<(), AcquisitionError> {
    let mut components = Path::new(file_name).components();
    let single_plain_name = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(name)), None) if name == file_name
    );

    if !single_plain_name || file_name.contains('\\') || RESERVED_NAMES.contains(&file_name) {
        return Err(AcquisitionError::InvalidOutputName {
            name: file_name.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CollectorInfo;
    use chrono::Utc;
    use serde_json::Value;
    use tempfile::TempDir;

    fn staged_record(storage: &Path) -> AcquisitionRecord {
        let mut record = AcquisitionRecord::new();
        record.storage_path = Some(storage.to_path_buf());
        record.apks_path = Some(storage.join("apks"));
        record.logs_path = Some(storage.join("logs"));
        record.cpu = "arm64-v8a".to_string();
        record.tmp_dir = "/data/local/tmp".to_string();
        record.collector = Some(CollectorInfo {
            exe_path: "/data/local/tmp/collector".to_string(),
            tmp_dir: "/data/local/tmp".to_string(),
            architecture: "arm64".to_string(),
        });
        record.mark_completed(Utc::now());
        record
    }

    #[test]
    fn test_snapshot_round_trip() {
        let dir = TempDir::new().unwrap();
        let record = staged_record(dir.path());

        let path = store_info(&record, dir.path()).unwrap();
        let loaded = load_info(&path).unwrap();

        assert_eq!(path, dir.path().join("acquisition.json"));
        assert_eq!(loaded, record);
    }

    #[test]
    fn test_snapshot_is_indented_with_expected_keys() {
        let dir = TempDir::new().unwrap();
        let record = staged_record(dir.path());

        let path = store_info(&record, dir.path()).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        let json: Value = serde_json::from_str(&text).unwrap();

        assert!(text.contains('\n'));
        assert!(text.contains("  \"uuid\""));
        assert_eq!(json["uuid"], record.uuid.to_string());
        assert_eq!(json["cpu"], "arm64-v8a");
        assert_eq!(json["collector"]["architecture"], "arm64");
        assert!(json.get("adapter").is_none());
    }

    #[test]
    fn test_unwritable_location_is_io_error() {
        let dir = TempDir::new().unwrap();
        let record = AcquisitionRecord::new();

        let err = store_info(&record, &dir.path().join("missing")).unwrap_err();

        assert!(matches!(err, AcquisitionError::Io { .. }));
    }

    #[test]
    fn test_corrupt_snapshot_is_serialization_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("acquisition.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            load_info(&path).unwrap_err(),
            AcquisitionError::Serialization(_)
        ));
    }

    #[test]
    fn test_save_output_writes_text() {
        let dir = TempDir::new().unwrap();

        let path = save_output(dir.path(), "packages.txt", "package:com.example\n").unwrap();

        assert_eq!(fs::read_to_string(path).unwrap(), "package:com.example\n");
    }

    #[test]
    fn test_save_output_rejects_escaping_and_reserved_names() {
        let base = TempDir::new().unwrap();
        let storage = base.path().join("session");
        fs::create_dir(&storage).unwrap();
        fs::write(storage.join("hashes.csv"), "sealed").unwrap();

        for name in [
            "../escape.txt",
            "nested/out.txt",
            "/tmp/abs.txt",
            "..",
            ".",
            "",
            "hashes.csv",
            "acquisition.json",
            "command.log",
            "apks",
        ] {
            let err = save_output(&storage, name, "x").unwrap_err();
            assert!(
                matches!(err, AcquisitionError::InvalidOutputName { .. }),
                "{:?} was accepted",
                name
            );
        }

        assert!(!base.path().join("escape.txt").exists());
        assert_eq!(fs::read_to_string(storage.join("hashes.csv")).unwrap(), "sealed");
    }
}
