//! Store wrappers for fault injection and call counting.

use async_trait::async_trait;
use snipstash_storage::{
    Document, DocumentStore, MemoryStore, Query, StorageError, StorageResult, StoredDocument,
};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A [`DocumentStore`] operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Add,
    Query,
    Delete,
}

/// A store that delegates to an inner store, counting calls and failing
/// on demand.
///
/// Queued failures are returned in order, one per matching call, before the
/// inner store is consulted.
///
/// # Example
///
/// ```rust,ignore
/// let store = ScriptedStore::new()
///     .fail_next(Operation::Query, StorageError::api("permission-denied", "Missing or insufficient permissions."));
///
/// assert!(session.probe().await.is_err());
/// assert_eq!(store.calls(Operation::Add), 0);
/// ```
pub struct ScriptedStore {
    inner: Arc<dyn DocumentStore>,
    calls: Mutex<HashMap<Operation, usize>>,
    failures: Mutex<HashMap<Operation, VecDeque<StorageError>>>,
    delays: Mutex<HashMap<Operation, Duration>>,
}

impl ScriptedStore {
    /// Wrap a fresh [`MemoryStore`].
    pub fn new() -> Self {
        Self::wrap(Arc::new(MemoryStore::new()))
    }

    pub fn wrap(inner: Arc<dyn DocumentStore>) -> Self {
        Self {
            inner,
            calls: Mutex::new(HashMap::new()),
            failures: Mutex::new(HashMap::new()),
            delays: Mutex::new(HashMap::new()),
        }
    }

    /// Queue a failure for the next call of `op`.
    pub fn fail_next(self, op: Operation, error: StorageError) -> Self {
        self.push_failure(op, error);
        self
    }

    pub fn push_failure(&self, op: Operation, error: StorageError) {
        self.failures
            .lock()
            .unwrap()
            .entry(op)
            .or_default()
            .push_back(error);
    }

    /// Hold every response of `op` for `delay`.
    ///
    /// The inner store has already served the call when the delay starts,
    /// so a delayed query returns what the store held at call time.
    pub fn delay(&self, op: Operation, delay: Duration) {
        self.delays.lock().unwrap().insert(op, delay);
    }

    /// Number of times `op` was called, including failed calls.
    pub fn calls(&self, op: Operation) -> usize {
        self.calls.lock().unwrap().get(&op).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }

    pub fn inner(&self) -> &Arc<dyn DocumentStore> {
        &self.inner
    }

    async fn hold(&self, op: Operation) {
        let delay = self.delays.lock().unwrap().get(&op).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn enter(&self, op: Operation) -> StorageResult<()> {
        *self.calls.lock().unwrap().entry(op).or_default() += 1;

        let failure = self
            .failures
            .lock()
            .unwrap()
            .get_mut(&op)
            .and_then(VecDeque::pop_front);
        match failure {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl Default for ScriptedStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for ScriptedStore {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn add(&self, collection: &str, document: Document) -> StorageResult<String> {
        self.enter(Operation::Add)?;
        let result = self.inner.add(collection, document).await;
        self.hold(Operation::Add).await;
        result
    }

    async fn query(&self, collection: &str, query: &Query) -> StorageResult<Vec<StoredDocument>> {
        self.enter(Operation::Query)?;
        let result = self.inner.query(collection, query).await;
        self.hold(Operation::Query).await;
        result
    }

    async fn delete(&self, collection: &str, id: &str) -> StorageResult<()> {
        self.enter(Operation::Delete)?;
        let result = self.inner.delete(collection, id).await;
        self.hold(Operation::Delete).await;
        result
    }
}
