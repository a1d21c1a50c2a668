//! Shared utilities for snipstash.
//!
//! This crate provides common utilities used across the snipstash workspace:
//! - ULID-based record identifier generation
//! - Logging setup with tracing
//! - Path utilities

pub mod id;
pub mod log;
pub mod path;

pub use id::Identifier;
pub use log::{LogConfig, LogLevel};
