//! Session integration tests.
//!
//! Drives the probe and the create/list/delete operations against fake
//! stores and a recording view.

use snipstash_core::render::render_list_html;
use snipstash_core::view::{Field, ListView};
use snipstash_core::{
    ConnectionState, CoreError, Session, SessionOptions, SnippetInput, StatusKind,
    ValidationError,
};
use snipstash_storage::{DocumentStore, MemoryStore, Query, StorageError};
use snipstash_test_utils::assertions::assert_strings_equal;
use snipstash_test_utils::{
    assert_err, assert_str_contains, fixtures, Operation, RecordingView, ScriptedStore, ViewEvent,
};
use std::sync::Arc;
use std::time::Duration;

const COLLECTION: &str = "savedCodes";

fn session_with(store: Arc<dyn DocumentStore>) -> (Session, Arc<RecordingView>) {
    let view = Arc::new(RecordingView::new());
    let session = Session::new(store, view.clone(), SessionOptions::default());
    (session, view)
}

async fn connected(store: Arc<dyn DocumentStore>) -> (Session, Arc<RecordingView>) {
    let (session, view) = session_with(store);
    session.probe().await.expect("probe should succeed");
    view.clear();
    (session, view)
}

// Probe

#[tokio::test]
async fn test_probe_success_enables_submit_and_lists_once() {
    let (session, view) = session_with(Arc::new(MemoryStore::new()));
    session.probe().await.unwrap();

    assert_eq!(session.connection().await, ConnectionState::Connected);
    assert_eq!(
        view.connection_states(),
        vec![ConnectionState::Testing, ConnectionState::Connected]
    );
    assert_eq!(view.submit_enabled(), Some(true));

    let status = view.statuses().into_iter().next().unwrap();
    assert_eq!(status.kind, StatusKind::Success);
    assert_eq!(status.title, "Firebase Connected");
    assert_eq!(status.message, "Successfully connected to Firebase Firestore.");
    assert_eq!(status.auto_hide, Some(Duration::from_secs(3)));

    assert_eq!(view.lists(), vec![ListView::Loading, ListView::Empty]);
}

#[tokio::test]
async fn test_probe_queries_then_lists() {
    let store = Arc::new(ScriptedStore::new());
    let (session, _view) = session_with(store.clone());
    session.probe().await.unwrap();

    // Probe query plus the list it triggers
    assert_eq!(store.calls(Operation::Query), 2);
    assert_eq!(store.calls(Operation::Add), 0);
}

#[tokio::test]
async fn test_probe_failure_keeps_submit_disabled_and_never_lists() {
    let store = Arc::new(ScriptedStore::new().fail_next(
        Operation::Query,
        StorageError::api("permission-denied", "permission-denied"),
    ));
    let (session, view) = session_with(store.clone());

    let err = session.probe().await.unwrap_err();
    assert!(matches!(err, CoreError::Probe(_)));

    assert_eq!(
        session.connection().await,
        ConnectionState::Failed("permission-denied".to_string())
    );
    assert_eq!(view.submit_states(), vec![false]);

    let status = view.last_status().unwrap();
    assert_eq!(status.kind, StatusKind::Error);
    assert_eq!(status.title, "Firebase Connection Error");
    assert_eq!(status.message, "permission-denied");

    assert!(view.lists().is_empty());
    assert_eq!(store.calls(Operation::Query), 1);
}

#[tokio::test]
async fn test_operations_refused_before_probe() {
    let store = Arc::new(ScriptedStore::new());
    let (session, view) = session_with(store.clone());

    let err = session
        .create(&SnippetInput::new("2024-01-01", "print(1)"))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NotConnected));
    let status = view.last_status().unwrap();
    assert_eq!(status.title, "Not Connected");
    assert_eq!(status.message, "Cannot save: Firebase is not connected.");

    assert!(matches!(
        session.list().await.unwrap_err(),
        CoreError::NotConnected
    ));
    assert!(view.lists().is_empty());

    let err = session.delete("abc").await.unwrap_err();
    assert!(matches!(err, CoreError::NotConnected));
    assert_eq!(
        view.last_status().unwrap().message,
        "Cannot delete: Firebase is not connected."
    );

    assert_eq!(store.total_calls(), 0);
}

// Creator

#[tokio::test]
async fn test_create_empty_date_makes_no_store_call() {
    let store = Arc::new(ScriptedStore::new());
    let (session, view) = connected(store.clone()).await;
    let before = store.total_calls();

    let err = session
        .create(&SnippetInput::new("", "print(1)"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CoreError::Validation(ValidationError::MissingDate)
    ));
    assert_eq!(store.total_calls(), before);

    let status = view.last_status().unwrap();
    assert_eq!(status.kind, StatusKind::Error);
    assert_eq!(status.title, "Missing Date");
    assert_eq!(status.message, "Please select a date.");
    assert_eq!(view.focused(), vec![Field::Date]);
    assert!(view.submit_states().is_empty());
}

#[tokio::test]
async fn test_create_whitespace_code_rejected_like_empty() {
    let store = Arc::new(ScriptedStore::new());
    let (session, view) = connected(store.clone()).await;

    let blank = assert_err!(
        session
            .create(&SnippetInput::new("2024-01-01", " \n\t "))
            .await
    );
    let blank_status = view.last_status().unwrap();
    view.clear();

    let empty = assert_err!(session.create(&SnippetInput::new("2024-01-01", "")).await);
    let empty_status = view.last_status().unwrap();

    assert!(matches!(
        blank,
        CoreError::Validation(ValidationError::MissingCode)
    ));
    assert!(matches!(
        empty,
        CoreError::Validation(ValidationError::MissingCode)
    ));
    assert_eq!(blank_status, empty_status);
    assert_eq!(view.focused(), vec![Field::Code]);
    assert_eq!(store.calls(Operation::Add), 0);
}

#[tokio::test]
async fn test_create_success_reports_id_and_clears_code() {
    let (session, view) = connected(Arc::new(MemoryStore::new())).await;

    let id = session
        .create(&SnippetInput::new("2024-01-01", "print(1)"))
        .await
        .unwrap();

    let status = view
        .statuses()
        .into_iter()
        .find(|s| s.title == "Saved Successfully!")
        .unwrap();
    assert_eq!(status.kind, StatusKind::Success);
    assert_eq!(status.message, format!("Data saved to Firebase with ID: {id}"));

    // The date input is never touched, only the code input
    assert_eq!(view.count(&ViewEvent::ClearCode), 1);
    assert!(view.focused().is_empty());

    // Submit disabled during the write, enabled before the refresh
    let events = view.events();
    let enabled_at = events
        .iter()
        .position(|e| *e == ViewEvent::SubmitEnabled(true))
        .unwrap();
    let loading_at = events
        .iter()
        .position(|e| *e == ViewEvent::RenderList(ListView::Loading))
        .unwrap();
    assert_eq!(events[0], ViewEvent::SubmitEnabled(false));
    assert!(enabled_at < loading_at);

    let ListView::Items(items) = view.last_list().unwrap() else {
        panic!("expected items");
    };
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, id);
}

#[tokio::test]
async fn test_create_stores_trimmed_code() {
    let (session, _view) = connected(Arc::new(MemoryStore::new())).await;

    session
        .create(&SnippetInput::new("2024-01-01", "  print(1)\n"))
        .await
        .unwrap();

    let records = session.list().await.unwrap();
    assert_eq!(records[0].code, "print(1)");
    assert_eq!(records[0].date.as_deref(), Some("2024-01-01"));
    assert!(records[0].timestamp.is_some());
    assert!(records[0].created.as_deref().unwrap().ends_with('Z'));
}

#[tokio::test]
async fn test_create_failure_reenables_submit() {
    let store = Arc::new(ScriptedStore::new());
    let (session, view) = connected(store.clone()).await;
    store.push_failure(
        Operation::Add,
        StorageError::api("unavailable", "The service is currently unavailable."),
    );

    let err = session
        .create(&SnippetInput::new("2024-01-01", "print(1)"))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Store(_)));

    assert_eq!(view.submit_states(), vec![false, true]);
    let status = view.last_status().unwrap();
    assert_eq!(status.title, "Save Failed");
    assert_eq!(status.message, "Error: The service is currently unavailable.");
    assert_eq!(view.count(&ViewEvent::ClearCode), 0);
    assert!(view.lists().is_empty());
}

// Lister

#[tokio::test]
async fn test_round_trip_escapes_code() {
    let (session, view) = connected(Arc::new(MemoryStore::new())).await;

    session
        .create(&SnippetInput::new("2024-01-01", "if a < b && c > d {}"))
        .await
        .unwrap();

    let list = view.last_list().unwrap();
    let item = &list.items()[0];
    assert_eq!(item.date, "2024-01-01");
    assert_eq!(item.code, "if a < b && c > d {}");
    assert_eq!(item.code_html, "if a &lt; b &amp;&amp; c &gt; d {}");

    let html = render_list_html(&list);
    assert!(html.contains("<div class=\"saved-code\">if a &lt; b &amp;&amp; c &gt; d {}</div>"));
    assert!(!html.contains("a < b"));
}

#[tokio::test]
async fn test_list_newest_first() {
    let store = fixtures::ticking_store();
    let (session, view) = connected(store.clone()).await;

    for code in ["first", "second", "third"] {
        session
            .create(&SnippetInput::new("2024-01-01", code))
            .await
            .unwrap();
    }

    let records = session.list().await.unwrap();
    let codes: Vec<&str> = records.iter().map(|r| r.code.as_str()).collect();
    assert_eq!(codes, vec!["third", "second", "first"]);
    assert_eq!(records[0].timestamp, Some(fixtures::tick(2)));

    let rendered: Vec<String> = view
        .last_list()
        .unwrap()
        .items()
        .iter()
        .map(|i| i.code.clone())
        .collect();
    assert_eq!(rendered, vec!["third", "second", "first"]);
}

#[tokio::test]
async fn test_list_is_idempotent() {
    let store = fixtures::ticking_store();
    store
        .insert(COLLECTION, "a", fixtures::snippet("2024-01-01", "<b>one</b>"))
        .unwrap();
    store
        .insert(COLLECTION, "b", fixtures::snippet("2024-01-02", "two"))
        .unwrap();
    let (session, view) = connected(store).await;

    session.list().await.unwrap();
    let first = render_list_html(&view.last_list().unwrap());
    session.list().await.unwrap();
    let second = render_list_html(&view.last_list().unwrap());

    assert_strings_equal(&second, &first);
}

#[tokio::test]
async fn test_list_orders_by_server_timestamp_not_insertion() {
    let store = Arc::new(MemoryStore::new());
    store
        .insert(COLLECTION, "old", fixtures::snippet_at("2024-01-01", "old", fixtures::tick(0)))
        .unwrap();
    store
        .insert(COLLECTION, "new", fixtures::snippet_at("2024-01-03", "new", fixtures::tick(5)))
        .unwrap();
    store
        .insert(COLLECTION, "mid", fixtures::snippet_at("2024-01-02", "mid", fixtures::tick(2)))
        .unwrap();
    let (session, view) = connected(store).await;

    let ids: Vec<String> = session
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(ids, vec!["new", "mid", "old"]);

    let html = render_list_html(&view.last_list().unwrap());
    assert_str_contains!(html, "data-id=\"new\"");
    let new_at = html.find("data-id=\"new\"").unwrap();
    let old_at = html.find("data-id=\"old\"").unwrap();
    assert!(new_at < old_at);
}

#[tokio::test]
async fn test_list_skips_documents_without_timestamp() {
    let store = Arc::new(MemoryStore::new());
    let created = fixtures::tick(0);
    store
        .insert(COLLECTION, "pending", fixtures::pending_snippet("", "x", created))
        .unwrap();
    let (session, _view) = connected(store).await;

    // No server timestamp, so the ordered query leaves it out
    let records = session.list().await.unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
async fn test_list_failure_renders_error_placeholder() {
    let store = Arc::new(ScriptedStore::new());
    let (session, view) = connected(store.clone()).await;
    store.push_failure(
        Operation::Query,
        StorageError::api("failed-precondition", "The query requires an index."),
    );

    let err = session.list().await.unwrap_err();
    assert!(matches!(err, CoreError::Store(_)));
    assert_eq!(
        view.lists(),
        vec![
            ListView::Loading,
            ListView::Error("The query requires an index.".to_string())
        ]
    );
    assert_eq!(
        render_list_html(&view.last_list().unwrap()),
        "<div class=\"empty-message\">Error loading data: The query requires an index.</div>\n"
    );
}

// Deleter

#[tokio::test]
async fn test_delete_only_record_shows_empty_not_loading() {
    let store = Arc::new(ScriptedStore::new());
    let (session, view) = connected(store.clone()).await;
    let id = session
        .create(&SnippetInput::new("2024-01-01", "print(1)"))
        .await
        .unwrap();
    view.clear();
    let queries = store.calls(Operation::Query);

    session.delete(&id).await.unwrap();

    assert_eq!(view.lists(), vec![ListView::Empty]);
    assert_eq!(store.calls(Operation::Query), queries);
    assert_eq!(
        view.confirm_prompts(),
        vec!["Are you sure you want to delete this item?"]
    );
    let status = view.last_status().unwrap();
    assert_eq!(status.kind, StatusKind::Success);
    assert_eq!(status.title, "Item Deleted");
    assert_eq!(status.message, "The item has been deleted successfully.");
}

#[tokio::test]
async fn test_delete_removes_only_matching_item() {
    let store = fixtures::ticking_store();
    let (session, view) = connected(store.clone()).await;
    let first = session
        .create(&SnippetInput::new("2024-01-01", "one"))
        .await
        .unwrap();
    let second = session
        .create(&SnippetInput::new("2024-01-02", "two"))
        .await
        .unwrap();

    session.delete(&first).await.unwrap();

    let ListView::Items(items) = view.last_list().unwrap() else {
        panic!("expected items");
    };
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, second);
    assert_eq!(store.count(COLLECTION).unwrap(), 1);
}

#[tokio::test]
async fn test_delete_declined_has_no_side_effect() {
    let store = Arc::new(ScriptedStore::new());
    let (session, view) = connected(store.clone()).await;
    view.set_confirm(false);

    let err = session.delete("abc").await.unwrap_err();
    assert!(err.is_aborted());
    assert_eq!(store.calls(Operation::Delete), 0);
    assert!(view.statuses().is_empty());
    assert!(view.lists().is_empty());
}

#[tokio::test]
async fn test_delete_failure_leaves_list_unchanged() {
    let store = Arc::new(ScriptedStore::new());
    let (session, view) = connected(store.clone()).await;
    let id = session
        .create(&SnippetInput::new("2024-01-01", "keep me"))
        .await
        .unwrap();
    let before = session.current_list().await;
    view.clear();
    store.push_failure(
        Operation::Delete,
        StorageError::api("permission-denied", "Missing or insufficient permissions."),
    );

    let err = session.delete(&id).await.unwrap_err();
    assert!(matches!(err, CoreError::Store(_)));

    let status = view.last_status().unwrap();
    assert_eq!(status.title, "Delete Failed");
    assert_eq!(status.message, "Error: Missing or insufficient permissions.");
    assert!(view.lists().is_empty());
    assert_eq!(session.current_list().await, before);
}

// Unserialized operations

#[tokio::test]
async fn test_slow_list_can_render_deleted_item() {
    let store = Arc::new(ScriptedStore::new());
    let (session, view) = connected(store.clone()).await;
    let id = session
        .create(&SnippetInput::new("2024-01-01", "short-lived"))
        .await
        .unwrap();
    view.clear();
    store.delay(Operation::Query, Duration::from_millis(100));

    // The refresh reads the store, then its response is held back
    let refresh = {
        let session = session.clone();
        tokio::spawn(async move { session.list().await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;

    session.delete(&id).await.unwrap();
    assert_eq!(view.last_status().unwrap().title, "Item Deleted");

    let records = refresh.await.unwrap().unwrap();
    assert_eq!(records.len(), 1);

    // The refresh landed last, so the deleted item is back on screen
    let ListView::Items(items) = view.last_list().unwrap() else {
        panic!("expected items");
    };
    assert_eq!(items[0].id, id);
    assert_eq!(session.current_list().await, view.last_list().unwrap());
    assert!(store
        .inner()
        .query(COLLECTION, &Query::new())
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_older_timer_hides_newer_status() {
    let view = Arc::new(RecordingView::new());
    let options = SessionOptions {
        status_duration: Duration::from_millis(200),
        ..Default::default()
    };
    let session = Session::new(Arc::new(MemoryStore::new()), view.clone(), options);

    session.clear_fields();
    tokio::time::sleep(Duration::from_millis(100)).await;
    session.clear_fields();

    // First timer has fired, the second has not
    tokio::time::sleep(Duration::from_millis(150)).await;
    let banners: Vec<&str> = view
        .events()
        .iter()
        .filter_map(|e| match e {
            ViewEvent::ShowStatus(_) => Some("show"),
            ViewEvent::HideStatus => Some("hide"),
            _ => None,
        })
        .collect();
    assert_eq!(banners, vec!["show", "show", "hide"]);
}

// ClearFields and status timing

#[tokio::test]
async fn test_clear_fields() {
    let (session, view) = connected(Arc::new(MemoryStore::new())).await;
    session.clear_fields();

    assert_eq!(view.count(&ViewEvent::ClearCode), 1);
    assert_eq!(view.focused(), vec![Field::Code]);
    let status = view.last_status().unwrap();
    assert_eq!(status.kind, StatusKind::Info);
    assert_eq!(status.title, "Fields Cleared");
    assert_eq!(
        status.message,
        "Code field has been cleared. Date remains unchanged."
    );
}

#[tokio::test]
async fn test_status_auto_hides() {
    let view = Arc::new(RecordingView::new());
    let options = SessionOptions {
        probe_status_duration: Duration::from_millis(10),
        status_duration: Duration::from_millis(10),
        ..Default::default()
    };
    let session = Session::new(Arc::new(MemoryStore::new()), view.clone(), options);
    session.probe().await.unwrap();
    session.clear_fields();

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(view.count(&ViewEvent::HideStatus), 2);
}

#[tokio::test]
async fn test_zero_duration_keeps_status() {
    let view = Arc::new(RecordingView::new());
    let options = SessionOptions {
        status_duration: Duration::ZERO,
        ..Default::default()
    };
    let session = Session::new(Arc::new(MemoryStore::new()), view.clone(), options);
    session.clear_fields();

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(view.last_status().unwrap().auto_hide, None);
    assert_eq!(view.count(&ViewEvent::HideStatus), 0);
}

#[test]
fn test_clear_fields_outside_runtime_keeps_status() {
    let view = Arc::new(RecordingView::new());
    let session = Session::new(
        Arc::new(MemoryStore::new()),
        view.clone(),
        SessionOptions::default(),
    );

    session.clear_fields();

    assert_eq!(view.count(&ViewEvent::ClearCode), 1);
    assert_eq!(view.last_status().unwrap().title, "Fields Cleared");
    assert_eq!(view.count(&ViewEvent::HideStatus), 0);
}
