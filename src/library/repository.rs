use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::foundation::error::{DraggenError, DraggenResult};
use crate::library::store::AssetStore;

/// Storage key the asset collection is written under.
pub const STORAGE_KEY: &str = "draggen-assets";

/// Durable string slots addressed by key.
pub trait KeyValueSlot {
    /// Read the value under `key`; `Ok(None)` when nothing was ever written.
    fn read(&self, key: &str) -> DraggenResult<Option<String>>;
    /// Replace the value under `key`.
    fn write(&mut self, key: &str, value: &str) -> DraggenResult<()>;
}

/// In-memory slots, for tests and ephemeral sessions.
#[derive(Clone, Debug, Default)]
pub struct MemorySlot {
    entries: BTreeMap<String, String>,
}

impl MemorySlot {
    /// An empty slot map.
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueSlot for MemorySlot {
    fn read(&self, key: &str) -> DraggenResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> DraggenResult<()> {
        self.entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// One `<key>.json` file per key inside a directory.
///
/// Writes go to a temporary sibling first and are renamed into place, so a crash mid-write
/// leaves the previous value intact.
#[derive(Clone, Debug)]
pub struct FileSlot {
    dir: PathBuf,
}

impl FileSlot {
    /// Slots stored under `dir` (created on first write).
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the slot files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueSlot for FileSlot {
    fn read(&self, key: &str) -> DraggenResult<Option<String>> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(DraggenError::persistence(format!(
                "read '{}': {e}",
                path.display()
            ))),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> DraggenResult<()> {
        let io_err = |what: &str, path: &Path, e: std::io::Error| {
            DraggenError::persistence(format!("{what} '{}': {e}", path.display()))
        };
        std::fs::create_dir_all(&self.dir).map_err(|e| io_err("create store dir", &self.dir, e))?;
        let path = self.path_for(key);
        let tmp = self.dir.join(format!(".{key}.json.tmp"));
        std::fs::write(&tmp, value).map_err(|e| io_err("write", &tmp, e))?;
        std::fs::rename(&tmp, &path).map_err(|e| io_err("move into place", &path, e))?;
        Ok(())
    }
}

/// Loads and saves a whole [`AssetStore`] through a [`KeyValueSlot`].
#[derive(Clone, Debug)]
pub struct AssetRepository<S> {
    slot: S,
    key: String,
}

impl<S: KeyValueSlot> AssetRepository<S> {
    /// Repository over `slot` using [`STORAGE_KEY`].
    pub fn new(slot: S) -> Self {
        Self::with_key(slot, STORAGE_KEY)
    }

    /// Repository over `slot` using a custom key.
    pub fn with_key(slot: S, key: impl Into<String>) -> Self {
        Self {
            slot,
            key: key.into(),
        }
    }

    /// Key the collection is stored under.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Borrow the underlying slot.
    pub fn slot(&self) -> &S {
        &self.slot
    }

    /// Read the stored collection, surfacing unreadable or corrupt data as
    /// [`DraggenError::Persistence`]. Missing data is an empty store.
    pub fn try_load(&self) -> DraggenResult<AssetStore> {
        match self.slot.read(&self.key)? {
            None => Ok(AssetStore::new()),
            Some(json) => AssetStore::from_json(&json),
        }
    }

    /// Read the stored collection; anything unreadable is discarded and an empty store returned.
    #[tracing::instrument(skip(self), fields(key = %self.key))]
    pub fn load(&self) -> AssetStore {
        match self.try_load() {
            Ok(store) => {
                tracing::debug!(assets = store.len(), "loaded asset store");
                store
            }
            Err(e) => {
                tracing::warn!(error = %e, "discarding unreadable asset store");
                AssetStore::new()
            }
        }
    }

    /// Write the whole collection.
    pub fn save(&mut self, store: &AssetStore) -> DraggenResult<()> {
        let json = store.to_json()?;
        self.slot.write(&self.key, &json)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/library/repository.rs"]
mod tests;
