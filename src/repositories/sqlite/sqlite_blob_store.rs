// src/repositories/sqlite/sqlite_blob_store.rs

use rusqlite::params;
use std::sync::Arc;

use crate::db::{get_connection, ConnectionPool};
use crate::error::{AppError, AppResult};
use crate::repositories::BlobStore;

pub struct SqliteBlobStore {
    pool: Arc<ConnectionPool>,
}

impl SqliteBlobStore {
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }
}

impl BlobStore for SqliteBlobStore {
    fn read(&self, name: &str) -> AppResult<Option<String>> {
        let conn = get_connection(&self.pool)?;

        match conn.query_row(
            "SELECT body FROM blobs WHERE name = ?1",
            params![name],
            |row| row.get::<_, String>(0),
        ) {
            Ok(body) => Ok(Some(body)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(AppError::Database(e)),
        }
    }

    fn write(&self, name: &str, body: &str) -> AppResult<()> {
        let conn = get_connection(&self.pool)?;

        conn.execute(
            "INSERT INTO blobs (name, body, updated_at) VALUES (?1, ?2, datetime('now'))
             ON CONFLICT(name) DO UPDATE SET body = excluded.body, updated_at = excluded.updated_at",
            params![name, body],
        )?;

        Ok(())
    }

    fn delete(&self, name: &str) -> AppResult<()> {
        let conn = get_connection(&self.pool)?;
        conn.execute("DELETE FROM blobs WHERE name = ?1", params![name])?;
        Ok(())
    }
}
