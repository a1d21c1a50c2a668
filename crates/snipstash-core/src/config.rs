//! Configuration management for snipstash.
//!
//! Configuration is loaded from multiple sources and merged:
//! 1. Global config: `~/.config/snipstash/config.json`
//! 2. Environment variable: `SNIPSTASH_CONFIG_CONTENT`
//! 3. Project config: `snipstash.jsonc` or `snipstash.json` in the project directory
//! 4. An explicit config file (`--config`)
//! 5. Environment overrides: `SNIPSTASH_*` and `FIRESTORE_*` variables
//!
//! Supports JSONC (JSON with comments) and variable substitution:
//! - `{env:VAR_NAME}` - Substitute environment variable
//! - `{file:path}` - Substitute file contents

use crate::error::{ConfigError, CoreResult};
use crate::record::DEFAULT_COLLECTION;
use crate::session::SessionOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::OnceLock;
use std::time::Duration;

/// Static regex for variable substitution, compiled once.
static VAR_REGEX: OnceLock<regex::Regex> = OnceLock::new();

fn var_regex() -> &'static regex::Regex {
    VAR_REGEX.get_or_init(|| {
        regex::Regex::new(r"\{(env|file):([^}]+)\}")
            .expect("Invalid regex pattern - this is a compile-time constant")
    })
}

const REDACTED: &str = "********";

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// JSON Schema reference.
    #[serde(rename = "$schema", skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Which document store to use.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<BackendKind>,

    /// Collection holding saved snippets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,

    /// Log level.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<LogLevel>,

    /// Local JSON store settings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json: Option<JsonConfig>,

    /// Cloud Firestore settings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firestore: Option<FirestoreConfig>,

    /// Status banner timing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<StatusConfig>,
}

/// Document store backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Process-local, gone on exit.
    Memory,
    /// One JSON file per record under the data directory.
    #[default]
    Json,
    /// Cloud Firestore REST API.
    Firestore,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Memory => "memory",
            BackendKind::Json => "json",
            BackendKind::Firestore => "firestore",
        }
    }
}

impl FromStr for BackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "memory" => Ok(BackendKind::Memory),
            "json" => Ok(BackendKind::Json),
            "firestore" => Ok(BackendKind::Firestore),
            _ => Err(ConfigError::UnknownBackend(s.to_string())),
        }
    }
}

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for snipstash_util::LogLevel {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => snipstash_util::LogLevel::Trace,
            LogLevel::Debug => snipstash_util::LogLevel::Debug,
            LogLevel::Info => snipstash_util::LogLevel::Info,
            LogLevel::Warn => snipstash_util::LogLevel::Warn,
            LogLevel::Error => snipstash_util::LogLevel::Error,
        }
    }
}

/// JSON store configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JsonConfig {
    /// Directory holding one subdirectory per collection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Firestore configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FirestoreConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,

    /// Database id, `(default)` if unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,

    /// Web API key, sent as the `key` query parameter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// OAuth bearer token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,

    /// Override the REST endpoint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// `host:port` of a local emulator. Takes precedence over `base_url`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emulator_host: Option<String>,

    /// Request timeout in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl FirestoreConfig {
    fn merge(self, other: Self) -> Self {
        Self {
            project_id: merge_option(self.project_id, other.project_id),
            database: merge_option(self.database, other.database),
            api_key: merge_option(self.api_key, other.api_key),
            access_token: merge_option(self.access_token, other.access_token),
            base_url: merge_option(self.base_url, other.base_url),
            emulator_host: merge_option(self.emulator_host, other.emulator_host),
            timeout_secs: merge_option(self.timeout_secs, other.timeout_secs),
        }
    }
}

/// Status banner timing, in milliseconds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusConfig {
    /// How long the probe's success banner stays up.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success_ms: Option<u64>,

    /// How long every other banner stays up. Zero keeps banners up.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_ms: Option<u64>,
}

impl Config {
    /// Load configuration from all sources, reading overrides from the
    /// process environment.
    pub async fn load(
        project_dir: Option<&Path>,
        explicit: Option<&Path>,
    ) -> CoreResult<(Self, Vec<PathBuf>)> {
        let global_dir = snipstash_util::path::config_dir();
        Self::load_with_env(global_dir.as_deref(), project_dir, explicit, |name| {
            std::env::var(name).ok()
        })
        .await
    }

    /// Load configuration from all sources.
    ///
    /// Loading order (later sources override earlier):
    /// 1. Global config from `global_dir` (normally `~/.config/snipstash/`)
    /// 2. `SNIPSTASH_CONFIG_CONTENT`
    /// 3. Project config from `project_dir`
    /// 4. `explicit`, which must exist
    /// 5. Environment overrides
    ///
    /// Every environment read, `{env:VAR}` references included, goes
    /// through `env`.
    pub async fn load_with_env<F>(
        global_dir: Option<&Path>,
        project_dir: Option<&Path>,
        explicit: Option<&Path>,
        env: F,
    ) -> CoreResult<(Self, Vec<PathBuf>)>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();
        let mut sources = Vec::new();

        // 1. Load global config
        if let Some(global_dir) = global_dir {
            for name in &["config.json", "snipstash.json", "snipstash.jsonc"] {
                let path = global_dir.join(name);
                if path.exists() {
                    let loaded = Self::load_file_with_env(&path, &env).await?;
                    config = config.merge(loaded);
                    sources.push(path);
                    break;
                }
            }
        }

        // 2. Load from environment variable
        if let Some(content) = env("SNIPSTASH_CONFIG_CONTENT") {
            let loaded = Self::parse_jsonc(&content, "<env>")?;
            config = config.merge(loaded);
        }

        // 3. Load project config
        if let Some(dir) = project_dir {
            for path in snipstash_util::path::project_config_files(dir) {
                if path.exists() {
                    let loaded = Self::load_file_with_env(&path, &env).await?;
                    config = config.merge(loaded);
                    sources.push(path);
                    break;
                }
            }
        }

        // 4. Explicit file
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(ConfigError::InvalidPath(format!(
                    "config file not found: {}",
                    path.display()
                ))
                .into());
            }
            let loaded = Self::load_file_with_env(path, &env).await?;
            config = config.merge(loaded);
            sources.push(path.to_path_buf());
        }

        // 5. Environment overrides
        config.apply_env_overrides(&env)?;

        Ok((config, sources))
    }

    /// Load configuration from a file.
    pub async fn load_file(path: &Path) -> CoreResult<Self> {
        Self::load_file_with_env(path, |name| std::env::var(name).ok()).await
    }

    /// Load configuration from a file, resolving `{env:VAR}` through `env`.
    pub async fn load_file_with_env<F>(path: &Path, env: F) -> CoreResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let content = tokio::fs::read_to_string(path).await?;
        let content = Self::substitute_variables(&content, path, env)?;
        Self::parse_jsonc(&content, &path.display().to_string())
    }

    /// Apply `SNIPSTASH_*` and `FIRESTORE_*` overrides.
    pub fn apply_env_overrides<F>(&mut self, env: F) -> CoreResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| env(name).filter(|v| !v.trim().is_empty());

        if let Some(backend) = non_empty("SNIPSTASH_BACKEND") {
            self.backend = Some(backend.parse()?);
        }
        if let Some(collection) = non_empty("SNIPSTASH_COLLECTION") {
            self.collection = Some(collection);
        }

        let overrides = FirestoreConfig {
            project_id: non_empty("FIRESTORE_PROJECT_ID"),
            api_key: non_empty("FIRESTORE_API_KEY"),
            emulator_host: non_empty("FIRESTORE_EMULATOR_HOST"),
            ..Default::default()
        };
        if overrides.project_id.is_some()
            || overrides.api_key.is_some()
            || overrides.emulator_host.is_some()
        {
            let current = self.firestore.take().unwrap_or_default();
            self.firestore = Some(current.merge(overrides));
        }

        Ok(())
    }

    /// Parse JSONC (JSON with comments).
    pub fn parse_jsonc(content: &str, source: &str) -> CoreResult<Self> {
        let stripped = Self::strip_comments(content);

        serde_json::from_str(&stripped).map_err(|e| {
            ConfigError::InvalidJson {
                path: source.to_string(),
                message: e.to_string(),
            }
            .into()
        })
    }

    /// Strip `//` and `/* */` comments outside of string literals.
    fn strip_comments(input: &str) -> String {
        let mut result = String::with_capacity(input.len());
        let mut chars = input.chars().peekable();
        let mut in_string = false;
        let mut escape_next = false;

        while let Some(c) = chars.next() {
            if escape_next {
                result.push(c);
                escape_next = false;
                continue;
            }

            if in_string {
                match c {
                    '\\' => escape_next = true,
                    '"' => in_string = false,
                    _ => {}
                }
                result.push(c);
                continue;
            }

            match (c, chars.peek()) {
                ('"', _) => {
                    in_string = true;
                    result.push(c);
                }
                ('/', Some('/')) => {
                    chars.next();
                    for c in chars.by_ref() {
                        if c == '\n' {
                            result.push('\n');
                            break;
                        }
                    }
                }
                ('/', Some('*')) => {
                    chars.next();
                    let mut prev = ' ';
                    for c in chars.by_ref() {
                        if prev == '*' && c == '/' {
                            break;
                        }
                        // Keep line numbers stable for parse errors
                        if c == '\n' {
                            result.push('\n');
                        }
                        prev = c;
                    }
                }
                _ => result.push(c),
            }
        }

        result
    }

    /// Substitute `{env:VAR}` and `{file:path}` references.
    ///
    /// File paths are relative to the config file.
    fn substitute_variables<F>(content: &str, config_path: &Path, env: F) -> CoreResult<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config_dir = config_path.parent().unwrap_or(Path::new("."));
        let mut result = content.to_string();

        for cap in var_regex().captures_iter(content) {
            let (Some(full_match), Some(kind), Some(value)) = (cap.get(0), cap.get(1), cap.get(2))
            else {
                continue;
            };
            let value = value.as_str();

            let replacement = match kind.as_str() {
                "env" => env(value).ok_or_else(|| ConfigError::EnvVarNotFound {
                    name: value.to_string(),
                })?,
                "file" => {
                    let file_path = config_dir.join(value);
                    std::fs::read_to_string(&file_path)
                        .map(|v| v.trim().to_string())
                        .map_err(|_| ConfigError::FileRefNotFound {
                            path: file_path.display().to_string(),
                        })?
                }
                _ => continue,
            };

            result = result.replace(full_match.as_str(), &replacement);
        }

        Ok(result)
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(mut self, other: Self) -> Self {
        self.schema = merge_option(self.schema, other.schema);
        self.backend = merge_option(self.backend, other.backend);
        self.collection = merge_option(self.collection, other.collection);
        self.log_level = merge_option(self.log_level, other.log_level);

        self.json = match (self.json, other.json) {
            (Some(base), Some(o)) => Some(JsonConfig {
                path: merge_option(base.path, o.path),
            }),
            (b, o) => o.or(b),
        };
        self.firestore = match (self.firestore, other.firestore) {
            (Some(base), Some(o)) => Some(base.merge(o)),
            (b, o) => o.or(b),
        };
        self.status = match (self.status, other.status) {
            (Some(base), Some(o)) => Some(StatusConfig {
                success_ms: merge_option(base.success_ms, o.success_ms),
                default_ms: merge_option(base.default_ms, o.default_ms),
            }),
            (b, o) => o.or(b),
        };

        self
    }

    pub fn backend(&self) -> BackendKind {
        self.backend.unwrap_or_default()
    }

    pub fn collection(&self) -> &str {
        self.collection.as_deref().unwrap_or(DEFAULT_COLLECTION)
    }

    pub fn log_level(&self) -> LogLevel {
        self.log_level.unwrap_or_default()
    }

    /// Session settings derived from this config.
    pub fn session_options(&self) -> SessionOptions {
        let mut options = SessionOptions {
            collection: self.collection().to_string(),
            ..Default::default()
        };
        if let Some(status) = &self.status {
            if let Some(ms) = status.success_ms {
                options.probe_status_duration = Duration::from_millis(ms);
            }
            if let Some(ms) = status.default_ms {
                options.status_duration = Duration::from_millis(ms);
            }
        }
        options
    }

    /// A copy with credentials masked, for display.
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if let Some(firestore) = config.firestore.as_mut() {
            if firestore.api_key.is_some() {
                firestore.api_key = Some(REDACTED.to_string());
            }
            if firestore.access_token.is_some() {
                firestore.access_token = Some(REDACTED.to_string());
            }
        }
        config
    }
}

/// Merge two Option values.
fn merge_option<T>(base: Option<T>, other: Option<T>) -> Option<T> {
    match (base, other) {
        (_, Some(o)) => Some(o),
        (b, None) => b,
    }
}
