// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Device-scoped key/value slots.
//!
//! Values are strings, like browser local storage: the favorites slot holds
//! a JSON array and each filter checkbox slot holds `"true"` or `"false"`.

use dashmap::DashMap;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Errors from local storage backends.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Failed to access storage file: {0}")]
    Io(String),

    #[error("Storage contents are corrupt: {0}")]
    Corrupt(String),

    #[error("Storage unavailable")]
    Unavailable,
}

/// String slots scoped to one device.
pub trait LocalStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-memory slots.
#[derive(Default)]
pub struct MemoryStorage {
    slots: DashMap<String, String>,
    unavailable: AtomicBool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent access fail (quota exceeded, private mode, ...).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), StorageError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable);
        }
        Ok(())
    }
}

impl LocalStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.check()?;
        Ok(self.slots.get(key).map(|v| v.value().clone()))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check()?;
        self.slots.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Slots persisted as one JSON object per device file.
///
/// The file is read once when the storage is opened and the slots are
/// served from memory afterwards. Each write replaces the whole file with a
/// temp-file rename, on the blocking pool when a runtime is running.
pub struct FileStorage {
    path: PathBuf,
    slots: Mutex<BTreeMap<String, String>>,
    version: AtomicU64,
    /// Version of the contents last written to disk.
    written: Arc<Mutex<u64>>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl FileStorage {
    /// Open the storage file at `path`. A missing file is empty, and so is
    /// one that cannot be read or parsed: the next write replaces it.
    pub async fn open<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let slots: BTreeMap<String, String> = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Discarding corrupt device storage"
                );
                BTreeMap::new()
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Error reading device storage");
                BTreeMap::new()
            }
        };

        Self {
            path,
            slots: Mutex::new(slots),
            version: AtomicU64::new(0),
            written: Arc::new(Mutex::new(0)),
            pending: Mutex::new(None),
        }
    }

    /// Storage file for a device under `dir`.
    pub async fn for_device<P: AsRef<Path>>(dir: P, device_id: &str) -> Self {
        let file_name = format!("{}.json", urlencoding::encode(device_id));
        Self::open(dir.as_ref().join(file_name)).await
    }

    /// Wait for the most recent write to reach the disk.
    pub async fn flush(&self) {
        let handle = lock(&self.pending).take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                tracing::error!(
                    path = %self.path.display(),
                    error = %e,
                    "Device storage write task failed"
                );
            }
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Write `contents` unless a newer version is already on disk.
fn persist(
    path: &Path,
    contents: &str,
    version: u64,
    written: &Mutex<u64>,
) -> Result<(), StorageError> {
    let mut written = lock(written);
    if *written >= version {
        return Ok(());
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| StorageError::Io(e.to_string()))?;
    }
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, contents).map_err(|e| StorageError::Io(e.to_string()))?;
    fs::rename(&tmp, path).map_err(|e| StorageError::Io(e.to_string()))?;
    *written = version;
    Ok(())
}

impl LocalStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(lock(&self.slots).get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let (contents, version) = {
            let mut slots = lock(&self.slots);
            slots.insert(key.to_string(), value.to_string());
            let contents =
                serde_json::to_string(&*slots).map_err(|e| StorageError::Corrupt(e.to_string()))?;
            (contents, self.version.fetch_add(1, Ordering::SeqCst) + 1)
        };

        match Handle::try_current() {
            Ok(runtime) => {
                let path = self.path.clone();
                let written = self.written.clone();
                let handle = runtime.spawn_blocking(move || {
                    if let Err(e) = persist(&path, &contents, version, &written) {
                        tracing::error!(
                            path = %path.display(),
                            error = %e,
                            "Error writing device storage"
                        );
                    }
                });
                *lock(&self.pending) = Some(handle);
                Ok(())
            }
            Err(_) => persist(&self.path, &contents, version, &self.written),
        }
    }
}
