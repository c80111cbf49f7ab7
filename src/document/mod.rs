// src/document/mod.rs
//
// Document Module
//
// Provides:
// - The live element tree with mutation observation
// - HTML serialization
// - Host page release markup

pub mod host;
pub mod html;
pub mod tree;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub use host::{
    append_release_rows, build_release_row, create_releases_table, HostRelease, BADGE_CLASS,
    PREVIEW_ATTRIBUTE, RELEASES_TABLE_ID,
};
pub use tree::{Document, MutationRecord, NodeId};

/// The document as shared between the scheduler, the enricher and
/// background rating refreshes. Never hold the guard across an `.await`.
pub type SharedDocument = Arc<Mutex<Document>>;

pub fn shared(document: Document) -> SharedDocument {
    Arc::new(Mutex::new(document))
}

/// Lock the shared document, recovering from a poisoned lock
pub fn lock_document(document: &Mutex<Document>) -> MutexGuard<'_, Document> {
    document.lock().unwrap_or_else(PoisonError::into_inner)
}
