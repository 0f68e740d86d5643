//! Storage errors
//!
//! Failures while loading or saving the link collection. I/O failures are
//! classified so the store can log a useful hint next to the warning.

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Linux `ENOSPC` and `EDQUOT`
const OUT_OF_SPACE_CODES: [i32; 2] = [28, 122];

/// Which side of the round trip failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoOp {
    Read,
    Write,
}

impl fmt::Display for IoOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IoOp::Read => f.write_str("read"),
            IoOp::Write => f.write_str("write"),
        }
    }
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("cannot create data directory {path:?}: {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("no permission to {op} {path:?}")]
    PermissionDenied {
        op: IoOp,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Disk or quota exhausted; the previous collection is still in place
    #[error("out of space while saving {path:?}")]
    QuotaExceeded {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot {op} {path:?}: {source}")]
    Io {
        op: IoOp,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The stored blob is not a JSON array of links
    #[error("link collection {path:?} is unreadable ({details}); a copy was kept at {backup_path:?}")]
    Corrupt {
        path: PathBuf,
        backup_path: PathBuf,
        details: String,
    },

    #[error("cannot encode link collection: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("cannot move {from:?} over {to:?}: {source}")]
    AtomicRename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StorageError {
    /// Classify an I/O failure on `path`
    pub fn from_io(op: IoOp, error: io::Error, path: PathBuf) -> Self {
        if error.kind() == io::ErrorKind::PermissionDenied {
            return StorageError::PermissionDenied {
                op,
                path,
                source: error,
            };
        }
        if op == IoOp::Write && is_out_of_space(&error) {
            return StorageError::QuotaExceeded {
                path,
                source: error,
            };
        }
        StorageError::Io {
            op,
            path,
            source: error,
        }
    }

    /// Whether the user can fix this without losing data
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            StorageError::QuotaExceeded { .. }
                | StorageError::PermissionDenied { .. }
                | StorageError::CreateDirectory { .. }
                | StorageError::Corrupt { .. }
        )
    }

    /// A hint for the user, if there is one
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            StorageError::QuotaExceeded { .. } => {
                Some("free some disk space; links added since are kept until the next save")
            }
            StorageError::PermissionDenied { .. } | StorageError::CreateDirectory { .. } => {
                Some("point data_dir at a writable directory (linkshelf config set data_dir <path>)")
            }
            StorageError::Corrupt { .. } => {
                Some("restore the backup copy by hand or re-import from GitHub/Vercel")
            }
            _ => None,
        }
    }
}

fn is_out_of_space(error: &io::Error) -> bool {
    if let Some(code) = error.raw_os_error() {
        return OUT_OF_SPACE_CODES.contains(&code);
    }
    let msg = error.to_string().to_lowercase();
    msg.contains("no space left") || msg.contains("quota exceeded")
}

pub type StorageResult<T> = Result<T, StorageError>;
