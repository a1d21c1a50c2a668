//! The client session: connection state plus the four store operations.
//!
//! A [`Session`] is created once at startup with a store and a view. The
//! connection probe runs first; creating and deleting records is refused
//! until it has succeeded.
//!
//! Operations are independent request/response round-trips. Nothing
//! serializes them: a list refresh that started before a delete finished
//! can still render the deleted record, and whichever render lands last
//! is what the view shows.
//!
//! # Example
//!
//! ```ignore
//! let session = Session::new(store, view, SessionOptions::default());
//! session.probe().await?;
//! let id = session.create(&SnippetInput::new("2024-01-01", "print(1)")).await?;
//! session.delete(&id).await?;
//! ```

use crate::error::{CoreError, CoreResult};
use crate::record::{self, fields, Record, SnippetInput, DEFAULT_COLLECTION};
use crate::render;
use crate::status::Status;
use crate::view::{Field, ListView, View};
use chrono::Utc;
use snipstash_storage::{Direction, DocumentStore, Query};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info};

const DELETE_PROMPT: &str = "Are you sure you want to delete this item?";

/// Connection to the document store, as established by the probe.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// Probe not run yet.
    #[default]
    Unknown,
    /// Probe in flight.
    Testing,
    Connected,
    /// Probe failed with this message.
    Failed(String),
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected)
    }

    /// Indicator text.
    pub fn label(&self) -> &'static str {
        match self {
            ConnectionState::Unknown => "Not connected",
            ConnectionState::Testing => "Testing Firebase connection...",
            ConnectionState::Connected => "Connected to Firebase",
            ConnectionState::Failed(_) => "Firebase Connection Failed",
        }
    }
}

/// Session settings.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Collection holding the records.
    pub collection: String,
    /// Banner lifetime after a successful probe.
    pub probe_status_duration: Duration,
    /// Banner lifetime for everything else.
    pub status_duration: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            collection: DEFAULT_COLLECTION.to_string(),
            probe_status_duration: Duration::from_millis(3000),
            status_duration: Duration::from_millis(5000),
        }
    }
}

/// The snippet store client context.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    store: Arc<dyn DocumentStore>,
    view: Arc<dyn View>,
    options: SessionOptions,

    connection: RwLock<ConnectionState>,

    /// What the view was last told to show.
    list: Mutex<ListView>,
}

impl Session {
    pub fn new(store: Arc<dyn DocumentStore>, view: Arc<dyn View>, options: SessionOptions) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                store,
                view,
                options,
                connection: RwLock::new(ConnectionState::Unknown),
                list: Mutex::new(ListView::Blank),
            }),
        }
    }

    pub fn options(&self) -> &SessionOptions {
        &self.inner.options
    }

    pub async fn connection(&self) -> ConnectionState {
        self.inner.connection.read().await.clone()
    }

    pub async fn is_connected(&self) -> bool {
        self.inner.connection.read().await.is_connected()
    }

    /// The list model as last rendered.
    pub async fn current_list(&self) -> ListView {
        self.inner.list.lock().await.clone()
    }

    /// Check that the store is reachable by reading at most one record.
    ///
    /// On success the submit control is enabled and the list is loaded.
    /// There is no retry; a failed probe leaves the session disconnected.
    pub async fn probe(&self) -> CoreResult<()> {
        let store = &self.inner.store;
        self.set_connection(ConnectionState::Testing).await;

        let query = Query::new().limit(1);
        match store.query(&self.inner.options.collection, &query).await {
            Ok(_) => {
                info!(backend = store.name(), "Connected to document store");
                self.set_connection(ConnectionState::Connected).await;
                self.inner.view.set_submit_enabled(true);
                self.show_status(
                    Status::success(
                        "Firebase Connected",
                        "Successfully connected to Firebase Firestore.",
                    )
                    .hide_after(self.inner.options.probe_status_duration),
                );

                if let Err(e) = self.list().await {
                    debug!(error = %e, "Initial list load failed");
                }
                Ok(())
            }
            Err(err) => {
                error!(backend = store.name(), error = %err, "Firebase connection error");
                self.set_connection(ConnectionState::Failed(err.message()))
                    .await;
                self.inner.view.set_submit_enabled(false);
                self.show_status(
                    Status::error("Firebase Connection Error", err.message())
                        .hide_after(self.inner.options.status_duration),
                );
                Err(CoreError::Probe(err))
            }
        }
    }

    /// Validate and save a new record, then refresh the list.
    ///
    /// Returns the id the store assigned.
    pub async fn create(&self, input: &SnippetInput) -> CoreResult<String> {
        if !self.is_connected().await {
            self.report_error("Not Connected", "Cannot save: Firebase is not connected.");
            return Err(CoreError::NotConnected);
        }

        let (date, code) = match input.validate() {
            Ok(valid) => valid,
            Err(e) => {
                self.report_error(e.title(), e.to_string());
                self.inner.view.focus(e.field());
                return Err(e.into());
            }
        };

        let submit = SubmitGuard::disable(self.inner.view.clone());
        let document = record::new_document(date, code, Utc::now());

        match self
            .inner
            .store
            .add(&self.inner.options.collection, document)
            .await
        {
            Ok(id) => {
                info!(id = %id, "Document written");
                self.show_status(
                    Status::success(
                        "Saved Successfully!",
                        format!("Data saved to Firebase with ID: {id}"),
                    )
                    .hide_after(self.inner.options.status_duration),
                );
                self.inner.view.clear_code();

                // Submit comes back before the refresh completes.
                drop(submit);
                if let Err(e) = self.list().await {
                    debug!(error = %e, "List refresh after save failed");
                }
                Ok(id)
            }
            Err(err) => {
                error!(error = %err, "Error adding document");
                self.report_error("Save Failed", format!("Error: {}", err.message()));
                Err(CoreError::Store(err))
            }
        }
    }

    /// Fetch every record, newest first, and render them.
    ///
    /// Does nothing while disconnected. Store failures are rendered in
    /// place of the list and also returned.
    pub async fn list(&self) -> CoreResult<Vec<Record>> {
        if !self.is_connected().await {
            debug!("Skipping list load while disconnected");
            return Err(CoreError::NotConnected);
        }

        self.render(ListView::Loading).await;

        let query = Query::new().order_by(fields::TIMESTAMP, Direction::Descending);
        match self
            .inner
            .store
            .query(&self.inner.options.collection, &query)
            .await
        {
            Ok(docs) => {
                let records: Vec<Record> = docs.into_iter().map(Record::from_stored).collect();
                debug!(count = records.len(), "Loaded saved items");
                if records.is_empty() {
                    self.render(ListView::Empty).await;
                } else {
                    let items = records.iter().map(render::list_item).collect();
                    self.render(ListView::Items(items)).await;
                }
                Ok(records)
            }
            Err(err) => {
                error!(error = %err, "Error loading documents");
                self.render(ListView::Error(err.message())).await;
                Err(CoreError::Store(err))
            }
        }
    }

    /// Delete a record after the user confirms.
    ///
    /// On success only the matching item leaves the rendered list; the rest
    /// of the list is not reloaded.
    pub async fn delete(&self, id: &str) -> CoreResult<()> {
        if !self.inner.view.confirm(DELETE_PROMPT).await {
            debug!(id, "Delete cancelled");
            return Err(CoreError::Aborted);
        }

        if !self.is_connected().await {
            self.report_error("Not Connected", "Cannot delete: Firebase is not connected.");
            return Err(CoreError::NotConnected);
        }

        match self
            .inner
            .store
            .delete(&self.inner.options.collection, id)
            .await
        {
            Ok(()) => {
                info!(id, "Document deleted");
                self.show_status(
                    Status::success("Item Deleted", "The item has been deleted successfully.")
                        .hide_after(self.inner.options.status_duration),
                );
                self.remove_item(id).await;
                Ok(())
            }
            Err(err) => {
                error!(id, error = %err, "Error deleting document");
                self.report_error("Delete Failed", format!("Error: {}", err.message()));
                Err(CoreError::Store(err))
            }
        }
    }

    /// Clear the code input and put the cursor back in it.
    ///
    /// Callable outside a runtime; the banner then stays up.
    pub fn clear_fields(&self) {
        self.inner.view.clear_code();
        self.inner.view.focus(Field::Code);
        self.show_status(
            Status::info(
                "Fields Cleared",
                "Code field has been cleared. Date remains unchanged.",
            )
            .hide_after(self.inner.options.status_duration),
        );
    }

    async fn set_connection(&self, state: ConnectionState) {
        let mut connection = self.inner.connection.write().await;
        self.inner.view.set_connection(&state);
        *connection = state;
    }

    async fn render(&self, list: ListView) {
        let mut current = self.inner.list.lock().await;
        self.inner.view.render_list(&list);
        *current = list;
    }

    async fn remove_item(&self, id: &str) {
        let mut current = self.inner.list.lock().await;
        let ListView::Items(items) = &mut *current else {
            return;
        };

        let before = items.len();
        items.retain(|item| item.id != id);
        if items.len() == before {
            return;
        }
        if items.is_empty() {
            *current = ListView::Empty;
        }
        self.inner.view.render_list(&current);
    }

    fn report_error(&self, title: impl Into<String>, message: impl Into<String>) {
        self.show_status(
            Status::error(title, message).hide_after(self.inner.options.status_duration),
        );
    }

    /// Show a banner and schedule its dismissal.
    ///
    /// The dismissal fires even if a newer banner replaced this one. Outside
    /// a tokio runtime there is nothing to run the timer, so the banner stays.
    fn show_status(&self, status: Status) {
        self.inner.view.show_status(&status);
        let Some(delay) = status.auto_hide else {
            return;
        };
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            debug!(title = %status.title, "No runtime, status will not auto-hide");
            return;
        };

        let view = self.inner.view.clone();
        runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            view.hide_status();
        });
    }
}

/// Keeps the submit control disabled while alive.
struct SubmitGuard {
    view: Arc<dyn View>,
}

impl SubmitGuard {
    fn disable(view: Arc<dyn View>) -> Self {
        view.set_submit_enabled(false);
        Self { view }
    }
}

impl Drop for SubmitGuard {
    fn drop(&mut self) {
        self.view.set_submit_enabled(true);
    }
}
