//! In-memory document store for testing and demos.

use crate::{
    validate_segment, Document, DocumentStore, Query, StorageError, StorageResult,
    StoredDocument,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use snipstash_util::Identifier;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};
use tracing::debug;

type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// In-memory document store.
///
/// This stores all data in memory and is not persistent.
pub struct MemoryStore {
    collections: RwLock<HashMap<String, BTreeMap<String, Document>>>,
    clock: Clock,
}

impl MemoryStore {
    /// Create a new in-memory store using the system clock.
    pub fn new() -> Self {
        Self::with_clock(Utc::now)
    }

    /// Create a store whose server timestamps come from `clock`.
    pub fn with_clock(clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            clock: Arc::new(clock),
        }
    }

    /// Insert a document under a caller-chosen id, replacing any existing one.
    pub fn insert(&self, collection: &str, id: &str, mut document: Document) -> StorageResult<()> {
        validate_segment("collection", collection)?;
        validate_segment("document id", id)?;
        document.resolve_server_timestamps((self.clock)());

        let mut collections = self
            .collections
            .write()
            .map_err(|e| StorageError::LockPoisoned(e.to_string()))?;
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), document);
        Ok(())
    }

    /// Number of documents in a collection.
    pub fn count(&self, collection: &str) -> StorageResult<usize> {
        let collections = self
            .collections
            .read()
            .map_err(|e| StorageError::LockPoisoned(e.to_string()))?;
        Ok(collections.get(collection).map_or(0, BTreeMap::len))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn add(&self, collection: &str, document: Document) -> StorageResult<String> {
        let id = Identifier::record();
        debug!(collection, id = %id, "Adding document to memory store");
        self.insert(collection, &id, document)?;
        Ok(id)
    }

    async fn query(&self, collection: &str, query: &Query) -> StorageResult<Vec<StoredDocument>> {
        validate_segment("collection", collection)?;
        let collections = self
            .collections
            .read()
            .map_err(|e| StorageError::LockPoisoned(e.to_string()))?;

        let documents = collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, doc)| StoredDocument::new(id.clone(), doc.clone()))
                    .collect()
            })
            .unwrap_or_default();

        Ok(query.apply(documents))
    }

    async fn delete(&self, collection: &str, id: &str) -> StorageResult<()> {
        validate_segment("collection", collection)?;
        validate_segment("document id", id)?;
        debug!(collection, id, "Deleting document from memory store");

        let mut collections = self
            .collections
            .write()
            .map_err(|e| StorageError::LockPoisoned(e.to_string()))?;
        if let Some(docs) = collections.get_mut(collection) {
            docs.remove(id);
        }
        Ok(())
    }
}
