// src/repositories/sqlite/mod.rs

pub mod sqlite_blob_store;

pub use sqlite_blob_store::SqliteBlobStore;
