//! File-backed storage primitives.
//!
//! # Responsibility
//! - Read and write line-delimited JSON collections.
//! - Commit every write through temp-file + rename in the target directory.
//! - Serialize index-wide maintenance through an advisory lock file.
//!
//! # Invariants
//! - A malformed line fails the whole read; partial collections are never
//!   returned to callers.
//! - Writes are whole-file rewrites; a reader observes either the old or the
//!   new version of a file, never a mix.
//! - No transactional scope exists across multiple files.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

mod jsonl;
mod lock;

pub use jsonl::{
    atomic_write, encode_lines, encode_record, parse_lines, read_all, read_all_with_lines, write_all,
    write_all_preserving,
};
pub use lock::IndexLock;

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage-layer error for JSONL persistence and locking.
#[derive(Debug)]
pub enum StoreError {
    /// Filesystem failure while reading, writing, renaming or locking.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// One line of a JSONL file could not be decoded.
    Corruption {
        path: PathBuf,
        line: usize,
        message: String,
    },
    /// A record could not be encoded to JSON.
    Serialize { path: PathBuf, message: String },
    /// The index lock is held by another process.
    Locked(PathBuf),
}

impl StoreError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Stable error code used in log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Io { .. } => "io_failed",
            Self::Corruption { .. } => "corrupt_record",
            Self::Serialize { .. } => "serialize_failed",
            Self::Locked(_) => "index_locked",
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "I/O error on `{}`: {source}", path.display()),
            Self::Corruption {
                path,
                line,
                message,
            } => write!(
                f,
                "invalid JSON on line {line} of `{}`: {message}",
                path.display()
            ),
            Self::Serialize { path, message } => {
                write!(f, "failed to encode record for `{}`: {message}", path.display())
            }
            Self::Locked(path) => write!(f, "index lock is held: `{}`", path.display()),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}
