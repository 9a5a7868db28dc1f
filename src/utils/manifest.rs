//! Evidence manifest (`hashes.csv`) generation and verification.
//!
//! The manifest lists every regular file under a session's storage path with
//! the SHA-256 of its contents, one `path,sha256` row per file and no header.
//! It is written inside the tree it describes, so the walk skips the manifest
//! itself; otherwise the growing file would hash a partial copy of itself.

use std::borrow::Cow;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::warn;
use walkdir::WalkDir;

use crate::constants::{LOG_TARGET, MANIFEST_FILE};
use crate::errors::AcquisitionError;
use crate::models::HashRecord;
use crate::utils::hash::calculate_sha256;

/// Hash every regular file under `storage_path` into `storage_path/hashes.csv`.
///
/// Directories are walked but not recorded, symlinks and other non-regular
/// entries are skipped. Any traversal, digest or write failure aborts the
/// whole run and removes the partial manifest.
pub fn write_manifest(storage_path: &Path) -> Result<Vec<HashRecord>, AcquisitionError> {
    let manifest_path = storage_path.join(MANIFEST_FILE);
    let file = File::create(&manifest_path)
        .map_err(|e| AcquisitionError::io(&manifest_path, e))?;

    record_or_discard(storage_path, &manifest_path, BufWriter::new(file))
}

/// Write the rows through `writer`. On failure the writer is dropped and the
/// file at `manifest_path` removed; if that removal fails too, the error says
/// so.
fn record_or_discard<W: Write>(
    storage_path: &Path,
    manifest_path: &Path,
    mut writer: W,
) -> Result<Vec<HashRecord>, AcquisitionError> {
    let result = hash_tree(storage_path, manifest_path, &mut writer).and_then(|records| {
        writer
            .flush()
            .map_err(|e| AcquisitionError::io(manifest_path, e))?;
        Ok(records)
    });
    drop(writer);

    result.map_err(|cause| match fs::remove_file(manifest_path) {
        Ok(()) => cause,
        Err(e) if e.kind() == io::ErrorKind::NotFound => cause,
        Err(e) => {
            warn!(
                target: LOG_TARGET,
                "Partial manifest {} left behind: {}",
                manifest_path.display(),
                e
            );
            AcquisitionError::ManifestCleanup {
                path: manifest_path.to_path_buf(),
                cause: Box::new(cause),
                source: e,
            }
        }
    })
}

fn hash_tree<W: Write>(
    root: &Path,
    manifest_path: &Path,
    writer: &mut W,
) -> Result<Vec<HashRecord>, AcquisitionError> {
    let mut records = Vec::new();

    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry.map_err(|e| AcquisitionError::Walk {
            path: e.path().unwrap_or(root).to_path_buf(),
            source: io::Error::from(e),
        })?;

        if !entry.file_type().is_file() || entry.path() == manifest_path {
            continue;
        }

        let path = entry.into_path();
        let sha256 = calculate_sha256(&path).map_err(|e| AcquisitionError::Walk {
            path: path.clone(),
            source: e,
        })?;

        writeln!(
            writer,
            "{},{}",
            encode_field(&path.to_string_lossy()),
            sha256
        )
        .map_err(|e| AcquisitionError::io(manifest_path, e))?;

        records.push(HashRecord { path, sha256 });
    }

    Ok(records)
}

fn encode_field(field: &str) -> Cow<'_, str> {
    let needs_quotes = field.is_empty()
        || field.starts_with(|c: char| c == ' ' || c == '\t')
        || field.contains(|c: char| matches!(c, ',' | '"' | '\r' | '\n'));

    if needs_quotes {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

/// Read a manifest back into its rows.
pub fn read_manifest(manifest_path: &Path) -> Result<Vec<HashRecord>, AcquisitionError> {
    let content = fs::read_to_string(manifest_path)
        .map_err(|e| AcquisitionError::io(manifest_path, e))?;
    let malformed = |reason: String| {
        AcquisitionError::io(
            manifest_path,
            io::Error::new(io::ErrorKind::InvalidData, reason),
        )
    };

    parse_rows(&content)
        .map_err(malformed)?
        .into_iter()
        .enumerate()
        .map(|(index, mut fields)| {
            if fields.len() != 2 {
                return Err(malformed(format!(
                    "row {} has {} fields, expected 2",
                    index + 1,
                    fields.len()
                )));
            }
            let sha256 = fields.pop().unwrap_or_default();
            let path = PathBuf::from(fields.pop().unwrap_or_default());
            Ok(HashRecord { path, sha256 })
        })
        .collect()
}

/// Split CSV text into rows of fields. Quoted fields may contain commas,
/// doubled quotes and line breaks.
fn parse_rows(content: &str) -> Result<Vec<Vec<String>>, String> {
    let mut rows = Vec::new();
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' if field.is_empty() => in_quotes = true,
            ',' => fields.push(std::mem::take(&mut field)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                fields.push(std::mem::take(&mut field));
                rows.push(std::mem::take(&mut fields));
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err("unterminated quoted field".to_string());
    }
    if !field.is_empty() || !fields.is_empty() {
        fields.push(field);
        rows.push(fields);
    }
    Ok(rows)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationStatus {
    /// Digest matches the manifest
    Verified,
    /// File exists but its digest differs
    Modified { actual: String },
    /// File listed in the manifest no longer exists
    Missing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedEntry {
    pub record: HashRecord,
    pub status: VerificationStatus,
}

/// Outcome of re-hashing every file listed in a manifest.
#[derive(Debug, Clone, Default)]
pub struct VerificationReport {
    pub entries: Vec<VerifiedEntry>,
}

impl VerificationReport {
    /// True when every listed file still has its recorded digest.
    pub fn is_intact(&self) -> bool {
        self.entries
            .iter()
            .all(|entry| entry.status == VerificationStatus::Verified)
    }

    pub fn failures(&self) -> impl Iterator<Item = &VerifiedEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.status != VerificationStatus::Verified)
    }
}

/// Re-hash every file listed in the manifest and compare digests.
pub fn verify_manifest(manifest_path: &Path) -> Result<VerificationReport, AcquisitionError> {
    let mut report = VerificationReport::default();

    for record in read_manifest(manifest_path)? {
        let status = match calculate_sha256(&record.path) {
            Ok(actual) if actual.eq_ignore_ascii_case(&record.sha256) => {
                VerificationStatus::Verified
            }
            Ok(actual) => VerificationStatus::Modified { actual },
            Err(e) if e.kind() == io::ErrorKind::NotFound => VerificationStatus::Missing,
            Err(e) => {
                return Err(AcquisitionError::Walk {
                    path: record.path,
                    source: e,
                })
            }
        };
        report.entries.push(VerifiedEntry { record, status });
    }

    Ok(report)
}
