//! Testing utilities, fixtures, and fakes for snipstash.
//!
//! This crate provides common testing infrastructure used across the snipstash workspace:
//!
//! - **Views**: A [`RecordingView`] that records everything the session draws
//! - **Stores**: A [`ScriptedStore`] that counts calls and injects failures
//! - **Fixtures**: Snippet documents and stores with a deterministic clock
//! - **Assertions**: Custom assertion helpers for common test patterns
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use snipstash_test_utils::{fixtures, RecordingView};
//!
//! #[tokio::test]
//! async fn test_probe_renders_list() {
//!     let view = Arc::new(RecordingView::new());
//!     let session = Session::new(fixtures::ticking_store(), view.clone(), Default::default());
//!     session.probe().await.unwrap();
//!     assert_eq!(view.lists(), vec![ListView::Loading, ListView::Empty]);
//! }
//! ```

pub mod assertions;
pub mod fixtures;
pub mod stores;
pub mod views;

// Re-export commonly used items
pub use stores::{Operation, ScriptedStore};
pub use views::{RecordingView, ViewEvent};
