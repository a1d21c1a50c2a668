//! Core client logic for snipstash.
//!
//! This crate provides the snippet store client:
//! - Configuration management (multi-source, JSONC support)
//! - The record model and its document mapping
//! - A [`Session`] context running the connection probe and the
//!   create/list/delete operations against a document store
//! - A declarative render model handed to a presentation-layer [`View`]
//! - HTML rendering of the saved-items list

pub mod backend;
pub mod config;
pub mod error;
pub mod record;
pub mod render;
pub mod session;
pub mod status;
pub mod view;

pub use backend::open_store;
pub use config::Config;
pub use error::{ConfigError, CoreError, CoreResult, ValidationError};
pub use record::{default_date, Record, SnippetInput};
pub use session::{ConnectionState, Session, SessionOptions};
pub use status::{Status, StatusKind};
pub use view::{Field, ListItem, ListView, View};
