//! Command handlers for the snipstash CLI.

pub mod logging;
pub mod snippet;

pub use logging::*;
pub use snippet::*;
