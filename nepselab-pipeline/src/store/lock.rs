//! Single-writer guard for the stores under one `data/` directory.
//!
//! The historical merge reads every existing key and then appends; two runs
//! interleaving those steps could both append the same key. A run therefore
//! holds this lock from discovery to merge.
//!
//! The guard is an OS advisory lock on `data/.pipeline.lock`. The kernel
//! drops it when the owning process exits, however it exits, so a killed run
//! never leaves the store locked. The file itself persists between runs.

use std::fs::{self, File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::{debug, warn};

use super::StoreError;

/// Exclusive lock held for the lifetime of the value; released on drop.
#[derive(Debug)]
pub struct StoreLock {
    path: PathBuf,
    file: File,
}

impl StoreLock {
    /// Lock the file at `path`, creating it if needed. Fails with
    /// [`StoreError::Locked`] while another handle holds it.
    pub fn acquire(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| StoreError::io(&path, e))?;

        if let Err(e) = file.try_lock_exclusive() {
            if e.raw_os_error() == fs2::lock_contended_error().raw_os_error() {
                return Err(StoreError::Locked(path));
            }
            return Err(StoreError::io(&path, e));
        }

        // Owner pid, informational only; a leftover pid from a dead run is
        // simply overwritten.
        file.set_len(0)
            .and_then(|()| file.seek(SeekFrom::Start(0)))
            .and_then(|_| writeln!(file, "{}", std::process::id()))
            .map_err(|e| StoreError::io(&path, e))?;
        debug!(path = %path.display(), "store lock acquired");
        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            warn!(path = %self.path.display(), error = %e, "failed to release store lock");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_fails_until_release() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data/.pipeline.lock");

        let first = StoreLock::acquire(&path).unwrap();
        assert!(path.exists());
        assert!(matches!(
            StoreLock::acquire(&path),
            Err(StoreError::Locked(_))
        ));

        drop(first);
        assert!(StoreLock::acquire(&path).is_ok());
    }

    #[test]
    fn leftover_lock_file_from_dead_run_is_reclaimed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data/.pipeline.lock");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "999999\n").unwrap();

        let lock = StoreLock::acquire(&path).unwrap();
        let owner = fs::read_to_string(lock.path()).unwrap();
        assert_eq!(owner.trim(), std::process::id().to_string());
    }
}
