//! Path utilities.

use std::path::{Path, PathBuf};

/// Get the snipstash configuration directory.
///
/// This follows XDG conventions on Linux/macOS:
/// - `$XDG_CONFIG_HOME/snipstash` if set
/// - `~/.config/snipstash` otherwise
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("snipstash"))
}

/// Get the snipstash data directory.
///
/// The JSON store keeps its collections here unless configured otherwise.
pub fn data_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|p| p.join("snipstash"))
}

/// Get the snipstash logs directory.
pub fn logs_dir() -> Option<PathBuf> {
    // macOS: ~/Library/Logs/snipstash
    // Linux: ~/.local/state/snipstash/logs
    #[cfg(target_os = "macos")]
    {
        if let Some(home) = dirs::home_dir() {
            return Some(home.join("Library/Logs/snipstash"));
        }
    }

    dirs::state_dir()
        .map(|p| p.join("snipstash").join("logs"))
        .or_else(|| data_dir().map(|p| p.join("logs")))
}

/// Project-local config files, in lookup order.
pub fn project_config_files(project_root: &Path) -> [PathBuf; 2] {
    [
        project_root.join("snipstash.jsonc"),
        project_root.join("snipstash.json"),
    ]
}
