//! Logging initialization.
//!
//! Logs go to a file in the platform log directory, or to stderr when
//! running verbose.

use snipstash_util::log::{self, LogConfig, LogLevel};
use std::path::PathBuf;

/// Initialize logging. Returns the log file path if logging to a file.
pub fn init_logging(verbose: bool, level: LogLevel) -> Option<PathBuf> {
    if verbose {
        let config = LogConfig {
            print: true,
            level: LogLevel::Debug,
            ..Default::default()
        };
        if let Err(e) = log::init(config) {
            eprintln!("Warning: Could not initialize logging: {e}");
        }
        return None;
    }

    let log_file = log::default_log_path()?;
    let config = LogConfig {
        level,
        file: Some(log_file.clone()),
        ..Default::default()
    };
    match log::init(config) {
        Ok(()) => Some(log_file),
        Err(e) => {
            eprintln!("Warning: Could not open log file: {e}");
            None
        }
    }
}
