//! JSON file-based document store.
//!
//! Each document is stored as a separate JSON file:
//! `("savedCodes", "rec_01h...")` -> `savedCodes/rec_01h....json`

use crate::{
    validate_segment, Document, DocumentStore, Query, StorageError, StorageResult,
    StoredDocument,
};
use async_trait::async_trait;
use chrono::Utc;
use snipstash_util::Identifier;
use std::path::PathBuf;
use tokio::fs;
use tracing::{debug, warn};

/// JSON file-based document store.
#[derive(Clone)]
pub struct JsonStore {
    base_path: PathBuf,
}

impl JsonStore {
    /// Create a new JSON store at the given base path.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Create a store in the default data directory.
    pub fn default_location() -> Option<Self> {
        snipstash_util::path::data_dir().map(|p| Self::new(p.join("collections")))
    }

    pub fn base_path(&self) -> &PathBuf {
        &self.base_path
    }

    fn collection_dir(&self, collection: &str) -> StorageResult<PathBuf> {
        validate_segment("collection", collection)?;
        Ok(self.base_path.join(collection))
    }

    fn document_path(&self, collection: &str, id: &str) -> StorageResult<PathBuf> {
        validate_segment("document id", id)?;
        let mut path = self.collection_dir(collection)?;
        path.push(format!("{id}.json"));
        Ok(path)
    }
}

#[async_trait]
impl DocumentStore for JsonStore {
    fn name(&self) -> &'static str {
        "json"
    }

    async fn add(&self, collection: &str, mut document: Document) -> StorageResult<String> {
        let id = Identifier::record();
        let path = self.document_path(collection, &id)?;
        debug!(path = %path.display(), "Writing document");

        document.resolve_server_timestamps(Utc::now());

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(&document)?;

        // Write atomically (write to temp file, then rename)
        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, &content).await?;
        fs::rename(&temp_path, &path).await?;

        Ok(id)
    }

    async fn query(&self, collection: &str, query: &Query) -> StorageResult<Vec<StoredDocument>> {
        let dir = self.collection_dir(collection)?;
        debug!(path = %dir.display(), "Querying collection");

        let mut documents = Vec::new();

        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(documents),
            Err(e) => return Err(StorageError::Io(e)),
        };

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();

            // Only include .json files (skips in-flight .json.tmp writes)
            if !path.extension().is_some_and(|ext| ext == "json") {
                continue;
            }
            let Some(id) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            let content = match fs::read_to_string(&path).await {
                Ok(content) => content,
                // Deleted between listing and reading
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(StorageError::Io(e)),
            };
            match serde_json::from_str::<Document>(&content) {
                Ok(document) => documents.push(StoredDocument::new(id, document)),
                Err(e) => warn!(path = %path.display(), error = %e, "Skipping unreadable document"),
            }
        }

        Ok(query.apply(documents))
    }

    async fn delete(&self, collection: &str, id: &str) -> StorageResult<()> {
        let path = self.document_path(collection, id)?;
        debug!(path = %path.display(), "Removing document");

        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Io(e)),
        }
    }
}
