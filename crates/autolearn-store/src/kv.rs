//! Key-value storage backends.

use fs2::FileExt;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::StoreError;

/// Synchronous string-valued storage shared by every tab of an origin.
///
/// Calls never suspend, so a read-compare-write sequence made by one caller
/// cannot interleave with another caller on the same cooperative scheduler.
pub trait KeyValueStore: Send + Sync {
    /// Read a value.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Overwrite a value.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete a value. Deleting a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// Replace the value only if it still equals `expected`.
    ///
    /// Returns whether the swap happened.
    fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<&str>,
        new: &str,
    ) -> Result<bool, StoreError>;
}

/// In-memory store for tests and single-process hosts.
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create a new memory store.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.write().remove(key);
        Ok(())
    }

    fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<&str>,
        new: &str,
    ) -> Result<bool, StoreError> {
        let mut entries = self.entries.write();
        if entries.get(key).map(String::as_str) != expected {
            return Ok(false);
        }
        entries.insert(key.to_string(), new.to_string());
        Ok(true)
    }
}

/// File-backed store.
///
/// All entries live in one JSON object file. Every operation re-reads the
/// file under an advisory lock on a sibling `.lock` file, so several
/// processes pointed at the same path observe each other's writes the way
/// tabs of one origin share local storage. Writes go through a uniquely named
/// temporary file that is persisted over the store file.
///
/// A store file that does not parse reads as empty. The next write moves it
/// aside to `<name>.corrupt` and starts over.
///
/// ```text
/// {
///   "ct_clicked_ids_v2": "[\"a1\",\"b2\"]",
///   "ct_auto_start_state": "true",
///   "ct_signal_next": "null"
/// }
/// ```
pub struct FileStore {
    path: PathBuf,
    lock_path: PathBuf,
}

/// Entries read from disk; `corrupt` is set when the file did not parse.
struct Loaded {
    entries: BTreeMap<String, String>,
    corrupt: bool,
}

impl FileStore {
    /// Open (or lazily create) a store at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        debug!("FileStore initialized at {:?}", path);

        Ok(Self {
            lock_path: path.with_extension("lock"),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self, exclusive: bool) -> Result<File, StoreError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.lock_path)?;
        if exclusive {
            file.lock_exclusive()?;
        } else {
            file.lock_shared()?;
        }
        Ok(file)
    }

    fn read_entries(&self) -> Result<Loaded, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => String::new(),
            Err(e) => return Err(e.into()),
        };
        if content.trim().is_empty() {
            return Ok(Loaded {
                entries: BTreeMap::new(),
                corrupt: false,
            });
        }

        match serde_json::from_str(&content) {
            Ok(entries) => Ok(Loaded {
                entries,
                corrupt: false,
            }),
            Err(e) => {
                warn!("Store file {:?} is corrupt, reading it as empty: {}", self.path, e);
                Ok(Loaded {
                    entries: BTreeMap::new(),
                    corrupt: true,
                })
            }
        }
    }

    fn write_entries(&self, loaded: &Loaded) -> Result<(), StoreError> {
        if loaded.corrupt {
            let aside = self.path.with_extension("json.corrupt");
            match fs::rename(&self.path, &aside) {
                Ok(()) => warn!("Moved corrupt store file to {:?}", aside),
                Err(e) => warn!("Failed to move corrupt store file aside: {}", e),
            }
        }

        let content = serde_json::to_string_pretty(&loaded.entries).map_err(|e| {
            StoreError::Serialization(format!("Failed to serialize store: {}", e))
        })?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }

    /// Read-modify-write under the exclusive lock. `apply` returns whether
    /// the entries changed.
    fn update<T>(
        &self,
        apply: impl FnOnce(&mut BTreeMap<String, String>) -> (bool, T),
    ) -> Result<T, StoreError> {
        let lock = self.lock(true)?;
        let mut loaded = self.read_entries()?;
        let (changed, result) = apply(&mut loaded.entries);
        if changed {
            self.write_entries(&loaded)?;
        }
        FileExt::unlock(&lock)?;
        Ok(result)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let lock = self.lock(false)?;
        let value = self.read_entries()?.entries.remove(key);
        FileExt::unlock(&lock)?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
            (true, ())
        })
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.update(|entries| (entries.remove(key).is_some(), ()))
    }

    fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<&str>,
        new: &str,
    ) -> Result<bool, StoreError> {
        self.update(|entries| {
            if entries.get(key).map(String::as_str) != expected {
                return (false, false);
            }
            entries.insert(key.to_string(), new.to_string());
            (true, true)
        })
    }
}

#[cfg(test)]
#[path = "kv_tests.rs"]
mod tests;
