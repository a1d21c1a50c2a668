//! Document store layer for snipstash.
//!
//! This crate provides a document store abstraction with multiple backends:
//! - Cloud Firestore over its REST API
//! - JSON file storage (one file per document)
//! - In-memory storage (for testing)
//!
//! Every backend offers the same three operations over a named collection:
//! add a document and get its id back, query the collection, delete by id.

pub mod document;
pub mod error;
pub mod firestore;
pub mod json;
pub mod memory;
pub mod query;

pub use document::{Document, FieldValue, StoredDocument};
pub use error::{StorageError, StorageResult};
pub use firestore::{FirestoreOptions, FirestoreStore};
pub use json::JsonStore;
pub use memory::MemoryStore;
pub use query::{Direction, OrderBy, Query};

use async_trait::async_trait;

/// A trait for document store backends.
///
/// Collections are flat: a collection name maps to a set of documents keyed
/// by store-assigned ids.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Short backend name, used in logs.
    fn name(&self) -> &'static str;

    /// Add a document and return the id the store assigned to it.
    ///
    /// Server timestamp directives are resolved by the store.
    async fn add(&self, collection: &str, document: Document) -> StorageResult<String>;

    /// Run a query against a collection.
    async fn query(&self, collection: &str, query: &Query) -> StorageResult<Vec<StoredDocument>>;

    /// Delete a document.
    ///
    /// Deleting a document that does not exist succeeds.
    async fn delete(&self, collection: &str, id: &str) -> StorageResult<()>;
}

/// Validate a collection name or document id.
///
/// Segments end up in file paths and URLs, so separators, relative
/// components and control characters are rejected.
pub(crate) fn validate_segment(kind: &str, segment: &str) -> StorageResult<()> {
    if segment.is_empty()
        || segment.contains('/')
        || segment.contains('\\')
        || segment.chars().any(char::is_control)
        || segment == "."
        || segment == ".."
    {
        return Err(StorageError::invalid_key(format!(
            "Invalid {kind}: {segment:?}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_segment() {
        assert!(validate_segment("collection", "savedCodes").is_ok());
        assert!(validate_segment("collection", "").is_err());
        assert!(validate_segment("id", "..").is_err());
        assert!(validate_segment("id", "a/b").is_err());
        assert!(validate_segment("id", "a\\b").is_err());
        assert!(validate_segment("id", "a\nb").is_err());
        assert!(validate_segment("id", "a\u{7f}b").is_err());
        assert!(validate_segment("id", "abc?x").is_ok());
    }
}
