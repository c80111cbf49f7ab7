// src/repositories/blob_store.rs
//
// Durable key-value substrate
//
// Each named blob is one serialized JSON document, read and replaced whole.
// The rating cache, the favorites set and the preferences all sit on top of
// this port.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, PoisonError};

use log::warn;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::AppResult;

pub trait BlobStore: Send + Sync {
    fn read(&self, name: &str) -> AppResult<Option<String>>;
    fn write(&self, name: &str, body: &str) -> AppResult<()>;
    fn delete(&self, name: &str) -> AppResult<()>;
}

/// Process-local blob store; contents vanish with the process
#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<HashMap<String, String>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlobStore for MemoryBlobStore {
    fn read(&self, name: &str) -> AppResult<Option<String>> {
        let blobs = self.blobs.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(blobs.get(name).cloned())
    }

    fn write(&self, name: &str, body: &str) -> AppResult<()> {
        let mut blobs = self.blobs.lock().unwrap_or_else(PoisonError::into_inner);
        blobs.insert(name.to_string(), body.to_string());
        Ok(())
    }

    fn delete(&self, name: &str) -> AppResult<()> {
        let mut blobs = self.blobs.lock().unwrap_or_else(PoisonError::into_inner);
        blobs.remove(name);
        Ok(())
    }
}

/// Load a blob as a map of entries.
///
/// Never fails: a missing blob is an empty map, an unreadable or unparseable
/// blob is logged and treated as empty, and individual entries that do not
/// match `T` are dropped while the parseable ones are kept.
pub fn load_map<T>(store: &dyn BlobStore, name: &str) -> BTreeMap<String, T>
where
    T: DeserializeOwned,
{
    let body = match store.read(name) {
        Ok(Some(body)) => body,
        Ok(None) => return BTreeMap::new(),
        Err(e) => {
            warn!("Could not read blob '{}', treating it as empty: {}", name, e);
            return BTreeMap::new();
        }
    };

    let object = match serde_json::from_str::<serde_json::Value>(&body) {
        Ok(serde_json::Value::Object(object)) => object,
        Ok(_) => {
            warn!("Blob '{}' is not a JSON object, treating it as empty", name);
            return BTreeMap::new();
        }
        Err(e) => {
            warn!("Blob '{}' is corrupt, treating it as empty: {}", name, e);
            return BTreeMap::new();
        }
    };

    let total = object.len();
    let entries: BTreeMap<String, T> = object
        .into_iter()
        .filter_map(|(key, value)| serde_json::from_value(value).ok().map(|v| (key, v)))
        .collect();

    if entries.len() < total {
        warn!(
            "Blob '{}' had {} unreadable entries; they will be dropped on next write",
            name,
            total - entries.len()
        );
    }

    entries
}

/// Replace a blob with the serialized map
pub fn save_map<T>(store: &dyn BlobStore, name: &str, entries: &BTreeMap<String, T>) -> AppResult<()>
where
    T: Serialize,
{
    let body = serde_json::to_string(entries)?;
    store.write(name, &body)
}
