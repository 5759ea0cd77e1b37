//! Advisory exclusive lock for index-wide maintenance.
//!
//! # Invariants
//! - The lock is held for the lifetime of the guard and released in `Drop`,
//!   which also runs while unwinding.
//! - Per-list item operations never take this lock.

use super::{StoreError, StoreResult};
use fs2::FileExt;
use log::{info, warn};
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Scoped guard over an exclusively locked sibling lock file.
#[derive(Debug)]
pub struct IndexLock {
    file: File,
    path: PathBuf,
}

impl IndexLock {
    /// Blocks until the exclusive lock on `path` is acquired.
    pub fn acquire(path: &Path) -> StoreResult<Self> {
        let started_at = Instant::now();
        let file = open_lock_file(path)?;
        file.lock_exclusive()
            .map_err(|err| StoreError::io(path, err))?;
        info!(
            "event=index_lock module=store status=ok mode=blocking wait_ms={} path={}",
            started_at.elapsed().as_millis(),
            path.display()
        );
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    /// Acquires the lock without waiting.
    ///
    /// Returns `StoreError::Locked` when another holder exists.
    pub fn try_acquire(path: &Path) -> StoreResult<Self> {
        let file = open_lock_file(path)?;
        match file.try_lock_exclusive() {
            Ok(()) => {
                info!(
                    "event=index_lock module=store status=ok mode=try path={}",
                    path.display()
                );
                Ok(Self {
                    file,
                    path: path.to_path_buf(),
                })
            }
            Err(err) if err.kind() == fs2::lock_contended_error().kind() => {
                warn!(
                    "event=index_lock module=store status=skip mode=try reason=contended path={}",
                    path.display()
                );
                Err(StoreError::Locked(path.to_path_buf()))
            }
            Err(err) => Err(StoreError::io(path, err)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for IndexLock {
    fn drop(&mut self) {
        if let Err(err) = FileExt::unlock(&self.file) {
            warn!(
                "event=index_unlock module=store status=error path={} error={}",
                self.path.display(),
                err
            );
        }
    }
}

fn open_lock_file(path: &Path) -> StoreResult<File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|err| StoreError::io(parent, err))?;
        }
    }
    OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(false)
        .open(path)
        .map_err(|err| StoreError::io(path, err))
}

#[cfg(test)]
mod tests {
    use super::IndexLock;
    use crate::store::StoreError;

    #[test]
    fn second_holder_is_rejected_until_guard_drops() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.lock");

        let guard = IndexLock::acquire(&path).unwrap();
        let err = IndexLock::try_acquire(&path).unwrap_err();
        assert!(matches!(err, StoreError::Locked(_)));

        drop(guard);
        let again = IndexLock::try_acquire(&path).unwrap();
        assert_eq!(again.path(), path.as_path());
    }

    #[test]
    fn lock_is_released_when_holder_panics() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.lock");
        let panic_path = path.clone();

        let result = std::panic::catch_unwind(move || {
            let _guard = IndexLock::acquire(&panic_path).unwrap();
            panic!("maintenance aborted");
        });
        assert!(result.is_err());
        assert!(IndexLock::try_acquire(&path).is_ok());
    }
}
