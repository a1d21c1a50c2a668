//! Opening the configured document store.

use crate::config::{BackendKind, Config};
use crate::error::{ConfigError, CoreResult};
use snipstash_storage::{DocumentStore, FirestoreOptions, FirestoreStore, JsonStore, MemoryStore};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Build the store named by `config.backend`.
pub fn open_store(config: &Config) -> CoreResult<Arc<dyn DocumentStore>> {
    let store: Arc<dyn DocumentStore> = match config.backend() {
        BackendKind::Memory => Arc::new(MemoryStore::new()),
        BackendKind::Json => {
            let configured = config.json.as_ref().and_then(|j| j.path.clone());
            let store = match configured {
                Some(path) => JsonStore::new(path),
                None => JsonStore::default_location().ok_or_else(|| {
                    ConfigError::InvalidPath("Could not determine data directory".to_string())
                })?,
            };
            info!(path = %store.base_path().display(), "Using JSON store");
            Arc::new(store)
        }
        BackendKind::Firestore => {
            let options = firestore_options(config)?;
            info!(
                project = %options.project_id,
                base_url = %options.base_url,
                "Using Firestore store"
            );
            Arc::new(FirestoreStore::new(options)?)
        }
    };
    Ok(store)
}

fn firestore_options(config: &Config) -> CoreResult<FirestoreOptions> {
    let firestore = config.firestore.clone().unwrap_or_default();
    let project_id = firestore
        .project_id
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| ConfigError::Validation {
            message: "firestore.project_id is required for the firestore backend".to_string(),
        })?;

    let mut options = match firestore.emulator_host {
        Some(host) => FirestoreOptions::emulator(project_id, &host),
        None => {
            let mut options = FirestoreOptions::new(project_id);
            if let Some(base_url) = firestore.base_url {
                options = options.with_base_url(base_url);
            }
            options
        }
    };

    if let Some(database) = firestore.database {
        options = options.with_database(database);
    }
    if let Some(api_key) = firestore.api_key {
        options = options.with_api_key(api_key);
    }
    if let Some(token) = firestore.access_token {
        options = options.with_access_token(token);
    }
    if let Some(secs) = firestore.timeout_secs {
        options = options.with_timeout(Duration::from_secs(secs));
    }
    Ok(options)
}
