// src/repositories/preference_repository.rs
//
// Preference collaborator: read/write of scalar display settings.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::domain::validate_preference_name;
use crate::error::AppResult;
use crate::repositories::blob_store::{load_map, save_map, BlobStore};

/// Blob name of the persisted preferences
pub const PREFERENCES_BLOB: &str = "preferences";

pub trait PreferenceStore: Send + Sync {
    fn read_preference(&self, name: &str, default: &str) -> String;
    fn write_preference(&self, name: &str, value: &str) -> AppResult<()>;
}

pub struct BlobPreferenceStore {
    store: Arc<dyn BlobStore>,
}

impl BlobPreferenceStore {
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self { store }
    }
}

impl PreferenceStore for BlobPreferenceStore {
    fn read_preference(&self, name: &str, default: &str) -> String {
        load_map::<String>(self.store.as_ref(), PREFERENCES_BLOB)
            .remove(name)
            .unwrap_or_else(|| default.to_string())
    }

    fn write_preference(&self, name: &str, value: &str) -> AppResult<()> {
        validate_preference_name(name)?;

        let mut values: BTreeMap<String, String> = load_map(self.store.as_ref(), PREFERENCES_BLOB);
        values.insert(name.to_string(), value.to_string());
        save_map(self.store.as_ref(), PREFERENCES_BLOB, &values)
    }
}
