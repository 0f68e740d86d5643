//! Link collection persistence
//!
//! The collection is saved as a single JSON array and always rewritten in
//! full. [`JsonFilePersistence`] writes it atomically (temp file, sync,
//! rename); [`MemoryPersistence`] keeps the same blob in memory.
//!
//! Storage location: `~/.local/share/linkshelf/links.json` (configurable via
//! `Config`)

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::warn;

use super::error::{IoOp, StorageError, StorageResult};
use crate::config::Config;
use crate::models::{Link, StoredLink};

/// Load/save of the whole collection as one opaque blob
pub trait Persistence {
    /// Load every stored record. An absent collection is an empty one.
    fn load(&self) -> StorageResult<Vec<StoredLink>>;

    /// Replace the stored collection with `links`
    fn save(&self, links: &[Link]) -> StorageResult<()>;
}

/// File size information for `status`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StorageStats {
    pub exists: bool,
    pub size_bytes: u64,
}

impl StorageStats {
    /// Human-readable size
    pub fn size_human(&self) -> String {
        let size = self.size_bytes as f64;
        if size < 1024.0 {
            format!("{} B", self.size_bytes)
        } else if size < 1024.0 * 1024.0 {
            format!("{:.1} KB", size / 1024.0)
        } else {
            format!("{:.1} MB", size / (1024.0 * 1024.0))
        }
    }
}

/// JSON file on disk
#[derive(Debug, Clone)]
pub struct JsonFilePersistence {
    path: PathBuf,
}

impl JsonFilePersistence {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Use the collection path from the configuration
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.links_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Where an unreadable collection is copied before it can be overwritten
    pub fn backup_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".corrupt.backup");
        PathBuf::from(name)
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub fn stats(&self) -> StorageStats {
        match fs::metadata(&self.path) {
            Ok(meta) => StorageStats {
                exists: true,
                size_bytes: meta.len(),
            },
            Err(_) => StorageStats::default(),
        }
    }
}

impl Persistence for JsonFilePersistence {
    fn load(&self) -> StorageResult<Vec<StoredLink>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.path)
            .map_err(|e| StorageError::from_io(IoOp::Read, e, self.path.clone()))?;

        decode(&content).map_err(|e| {
            let backup_path = self.backup_path();
            if let Err(copy_err) = fs::copy(&self.path, &backup_path) {
                warn!(
                    "Could not back up corrupt collection to {:?}: {}",
                    backup_path, copy_err
                );
            }
            StorageError::Corrupt {
                path: self.path.clone(),
                backup_path,
                details: e.to_string(),
            }
        })
    }

    fn save(&self, links: &[Link]) -> StorageResult<()> {
        let bytes = serde_json::to_vec_pretty(links)?;
        atomic_write(&self.path, &bytes)
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    blob: Option<String>,
    saves: usize,
    fail_saves: bool,
}

/// In-memory blob store
///
/// Clones share the same blob, so a second store opened on a clone sees what
/// the first one saved.
#[derive(Debug, Clone, Default)]
pub struct MemoryPersistence {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing serialized collection
    pub fn with_blob(blob: impl Into<String>) -> Self {
        let persistence = Self::new();
        persistence.lock().blob = Some(blob.into());
        persistence
    }

    /// The currently stored blob
    pub fn blob(&self) -> Option<String> {
        self.lock().blob.clone()
    }

    /// Number of successful saves so far
    pub fn save_count(&self) -> usize {
        self.lock().saves
    }

    /// Make every following save fail (simulates a full quota)
    pub fn set_fail_saves(&self, fail: bool) {
        self.lock().fail_saves = fail;
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Persistence for MemoryPersistence {
    fn load(&self) -> StorageResult<Vec<StoredLink>> {
        match self.lock().blob.as_deref() {
            None => Ok(Vec::new()),
            Some(content) => decode(content).map_err(|e| StorageError::Corrupt {
                path: PathBuf::from("<memory>"),
                backup_path: PathBuf::from("<memory>"),
                details: e.to_string(),
            }),
        }
    }

    fn save(&self, links: &[Link]) -> StorageResult<()> {
        let encoded = serde_json::to_string(links)?;
        let mut state = self.lock();
        if state.fail_saves {
            return Err(StorageError::QuotaExceeded {
                path: PathBuf::from("<memory>"),
                source: std::io::Error::new(std::io::ErrorKind::Other, "quota exceeded"),
            });
        }
        state.blob = Some(encoded);
        state.saves += 1;
        Ok(())
    }
}

/// Empty content and a literal `null` both mean "no links yet"
fn decode(content: &str) -> Result<Vec<StoredLink>, serde_json::Error> {
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    let links: Option<Vec<StoredLink>> = serde_json::from_str(content)?;
    Ok(links.unwrap_or_default())
}

/// Write data to a file atomically
///
/// Writes a sibling temp file, syncs it, then renames it over the target so
/// the collection is never left half-written.
fn atomic_write(path: &Path, data: &[u8]) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| StorageError::CreateDirectory {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let temp_path = path.with_extension("tmp");

    let mut file =
        File::create(&temp_path).map_err(|e| StorageError::from_io(IoOp::Write, e, temp_path.clone()))?;
    file.write_all(data)
        .map_err(|e| StorageError::from_io(IoOp::Write, e, temp_path.clone()))?;
    file.sync_all()
        .map_err(|e| StorageError::from_io(IoOp::Write, e, temp_path.clone()))?;

    fs::rename(&temp_path, path).map_err(|source| StorageError::AtomicRename {
        from: temp_path.clone(),
        to: path.to_path_buf(),
        source,
    })?;

    Ok(())
}
