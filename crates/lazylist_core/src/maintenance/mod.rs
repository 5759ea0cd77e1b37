//! Index-wide maintenance: reorder migration, mirror retirement and
//! integrity checks.
//!
//! # Responsibility
//! - Run whole-workspace passes that touch many list files at once.
//! - Collect per-list outcomes instead of stopping at the first failure.
//!
//! # Invariants
//! - Mutating passes hold the index lock for their whole duration.
//! - Nothing is deleted or rewritten without a backup copy on disk first.

pub mod consolidate;
pub mod integrity;
pub mod reorder;

use std::path::{Path, PathBuf};

/// First free path among `<base>`, `<base>.1`, `<base>.2`, ...
pub(crate) fn free_backup_path(base: PathBuf) -> PathBuf {
    if !base.exists() {
        return base;
    }
    let mut counter = 1u32;
    loop {
        let candidate = with_suffix(&base, &format!(".{counter}"));
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}

pub(crate) fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut raw = path.as_os_str().to_os_string();
    raw.push(suffix);
    PathBuf::from(raw)
}
