//! Cleanup of locally extracted assets (collector binaries and the like).

use std::fs;
use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use log::debug;

/// Process-wide cache of extracted assets, cleaned when a session completes.
pub trait AssetCache: Send + Sync {
    fn clean_all(&self) -> Result<()>;
}

/// Nothing was extracted, nothing to clean.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoAssetCache;

impl AssetCache for NoAssetCache {
    fn clean_all(&self) -> Result<()> {
        Ok(())
    }
}

/// Assets extracted as regular files into one local directory.
#[derive(Debug, Clone)]
pub struct DirectoryAssetCache {
    dir: PathBuf,
}

impl DirectoryAssetCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl AssetCache for DirectoryAssetCache {
    /// Remove every regular file in the asset directory. A missing directory
    /// counts as already clean; subdirectories are left alone.
    fn clean_all(&self) -> Result<()> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => {
                return Err(e).context(format!(
                    "Failed to read asset directory {}",
                    self.dir.display()
                ))
            }
        };

        for entry in entries {
            let entry = entry.context("Failed to read asset directory entry")?;
            if entry.file_type()?.is_file() {
                let path = entry.path();
                fs::remove_file(&path)
                    .context(format!("Failed to remove asset {}", path.display()))?;
                debug!("Removed asset {}", path.display());
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_clean_removes_files_only() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("collector_arm64"), b"elf").unwrap();
        fs::write(dir.path().join("collector_arm"), b"elf").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();

        DirectoryAssetCache::new(dir.path()).clean_all().unwrap();

        assert!(!dir.path().join("collector_arm64").exists());
        assert!(!dir.path().join("collector_arm").exists());
        assert!(dir.path().join("nested").is_dir());
    }

    #[test]
    fn test_missing_directory_is_already_clean() {
        let dir = TempDir::new().unwrap();

        assert!(DirectoryAssetCache::new(dir.path().join("gone"))
            .clean_all()
            .is_ok());
        assert!(NoAssetCache.clean_all().is_ok());
    }
}
