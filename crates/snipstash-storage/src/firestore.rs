//! Cloud Firestore backend over the REST API.
//!
//! Documents are written with `documents:commit` so server timestamp
//! directives can be sent as `REQUEST_TIME` field transforms, queried with
//! `documents:runQuery`, and deleted by name. Works against the production
//! endpoint or a local emulator.

use crate::{
    validate_segment, Direction, Document, DocumentStore, FieldValue, Query, StorageError,
    StorageResult, StoredDocument,
};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rand::{distributions::Alphanumeric, Rng};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{IntoUrl, Method, RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::time::Duration;
use tracing::{debug, trace, warn};

const DEFAULT_BASE_URL: &str = "https://firestore.googleapis.com";
const DEFAULT_DATABASE: &str = "(default)";
const AUTO_ID_LEN: usize = 20;

/// Connection options for [`FirestoreStore`].
#[derive(Debug, Clone)]
pub struct FirestoreOptions {
    pub project_id: String,
    pub database: String,
    pub base_url: String,
    /// Web API key, sent as the `key` query parameter.
    pub api_key: Option<String>,
    /// OAuth access token, sent as a bearer token.
    pub access_token: Option<String>,
    pub timeout: Duration,
}

impl FirestoreOptions {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            database: DEFAULT_DATABASE.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            access_token: None,
            timeout: Duration::from_secs(30),
        }
    }

    /// Options for a local emulator at `host` (e.g. `localhost:8080`).
    ///
    /// The emulator treats the `owner` token as an admin credential.
    pub fn emulator(project_id: impl Into<String>, host: &str) -> Self {
        Self::new(project_id)
            .with_base_url(format!("http://{host}"))
            .with_access_token("owner")
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Firestore document store.
pub struct FirestoreStore {
    client: reqwest::Client,
    options: FirestoreOptions,
}

impl FirestoreStore {
    /// Create a new Firestore store.
    pub fn new(options: FirestoreOptions) -> StorageResult<Self> {
        if options.project_id.is_empty() {
            return Err(StorageError::InvalidConfig(
                "Firestore project id is empty".to_string(),
            ));
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(token) = &options.access_token {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
                    StorageError::InvalidConfig("access token is not a valid header".to_string())
                })?,
            );
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(concat!("snipstash/", env!("CARGO_PKG_VERSION")))
            .timeout(options.timeout)
            .build()
            .map_err(|e| StorageError::InvalidConfig(e.to_string()))?;

        Ok(Self { client, options })
    }

    pub fn options(&self) -> &FirestoreOptions {
        &self.options
    }

    /// Resource name of the database's document root.
    fn documents_root(&self) -> String {
        format!(
            "projects/{}/databases/{}/documents",
            self.options.project_id, self.options.database
        )
    }

    fn url(&self, suffix: &str) -> String {
        format!(
            "{}/v1/{}{}",
            self.options.base_url.trim_end_matches('/'),
            self.documents_root(),
            suffix
        )
    }

    /// URL of a single document. Each segment is percent-encoded, so an id
    /// can never spill into the query string or fragment.
    fn document_url(&self, collection: &str, id: &str) -> StorageResult<Url> {
        let mut url = Url::parse(&self.url("")).map_err(|e| {
            StorageError::InvalidConfig(format!("invalid Firestore base url: {e}"))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                StorageError::InvalidConfig("Firestore base url cannot hold a path".to_string())
            })?
            .push(collection)
            .push(id);
        Ok(url)
    }

    fn request(&self, method: Method, url: impl IntoUrl) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.options.api_key {
            Some(key) => builder.query(&[("key", key)]),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> StorageResult<Response> {
        let response = builder.send().await?;
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(api_error(response).await)
        }
    }
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    fn name(&self) -> &'static str {
        "firestore"
    }

    async fn add(&self, collection: &str, mut document: Document) -> StorageResult<String> {
        validate_segment("collection", collection)?;
        let id = auto_id();
        let name = format!("{}/{}/{}", self.documents_root(), collection, id);
        debug!(name = %name, "Committing new Firestore document");

        let transforms = document.take_server_timestamps();
        let mut write = json!({
            "update": { "name": name, "fields": encode_fields(&document) },
            "currentDocument": { "exists": false },
        });
        if !transforms.is_empty() {
            write["updateTransforms"] = transforms
                .iter()
                .map(|field| {
                    json!({
                        "fieldPath": field_path(field),
                        "setToServerValue": "REQUEST_TIME",
                    })
                })
                .collect();
        }

        let body = json!({ "writes": [write] });
        self.send(self.request(Method::POST, self.url(":commit")).json(&body))
            .await?;

        Ok(id)
    }

    async fn query(&self, collection: &str, query: &Query) -> StorageResult<Vec<StoredDocument>> {
        validate_segment("collection", collection)?;

        let mut structured = json!({ "from": [{ "collectionId": collection }] });
        if let Some(order) = &query.order_by {
            let direction = match order.direction {
                Direction::Ascending => "ASCENDING",
                Direction::Descending => "DESCENDING",
            };
            structured["orderBy"] = json!([{
                "field": { "fieldPath": field_path(&order.field) },
                "direction": direction,
            }]);
        }
        if let Some(limit) = query.limit {
            structured["limit"] = json!(limit);
        }
        debug!(collection, query = %structured, "Running Firestore query");

        let response = self
            .send(
                self.request(Method::POST, self.url(":runQuery"))
                    .json(&json!({ "structuredQuery": structured })),
            )
            .await?;
        let body = response.text().await?;
        let items: Vec<RunQueryItem> = serde_json::from_str(&body)
            .map_err(|e| StorageError::invalid_response(format!("runQuery: {e}")))?;

        // Items without a document only carry progress info (readTime).
        Ok(items
            .into_iter()
            .filter_map(|item| item.document)
            .map(|doc| StoredDocument::new(document_id(&doc.name), decode_fields(&doc.fields)))
            .collect())
    }

    async fn delete(&self, collection: &str, id: &str) -> StorageResult<()> {
        validate_segment("collection", collection)?;
        validate_segment("document id", id)?;
        debug!(collection, id, "Deleting Firestore document");

        let url = self.document_url(collection, id)?;
        self.send(self.request(Method::DELETE, url)).await?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct RunQueryItem {
    document: Option<RestDocument>,
}

#[derive(Debug, Deserialize)]
struct RestDocument {
    name: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
    status: Option<String>,
}

/// Convert a failed response into a storage error.
async fn api_error(response: Response) -> StorageError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    // runQuery reports errors as a one-element array.
    let parsed = serde_json::from_str::<ErrorEnvelope>(&body).ok().or_else(|| {
        serde_json::from_str::<Vec<ErrorEnvelope>>(&body)
            .ok()
            .and_then(|v| v.into_iter().next())
    });

    match parsed {
        Some(envelope) => {
            let code = envelope
                .error
                .status
                .as_deref()
                .map(canonical_code)
                .unwrap_or_else(|| http_code(status).to_string());
            warn!(%status, code = %code, "Firestore request failed");
            StorageError::api(code, envelope.error.message)
        }
        None => {
            warn!(%status, "Firestore request failed without an error body");
            let message = if body.trim().is_empty() {
                status.to_string()
            } else {
                body
            };
            StorageError::api(http_code(status), message)
        }
    }
}

/// `PERMISSION_DENIED` -> `permission-denied`.
fn canonical_code(status: &str) -> String {
    status.to_ascii_lowercase().replace('_', "-")
}

fn http_code(status: StatusCode) -> &'static str {
    match status.as_u16() {
        400 => "invalid-argument",
        401 => "unauthenticated",
        403 => "permission-denied",
        404 => "not-found",
        409 => "already-exists",
        429 => "resource-exhausted",
        499 => "cancelled",
        500 => "internal",
        501 => "unimplemented",
        503 => "unavailable",
        504 => "deadline-exceeded",
        _ => "unknown",
    }
}

/// Client-side document id, same alphabet and length as the Firebase SDKs.
fn auto_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(AUTO_ID_LEN)
        .map(char::from)
        .collect()
}

/// Last segment of a document resource name.
fn document_id(name: &str) -> String {
    name.rsplit('/').next().unwrap_or(name).to_string()
}

/// Quote a field name unless it is a plain identifier.
fn field_path(field: &str) -> String {
    let simple = field
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && field.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if simple {
        field.to_string()
    } else {
        format!("`{}`", field.replace('\\', "\\\\").replace('`', "\\`"))
    }
}

fn encode_fields(document: &Document) -> Map<String, Value> {
    document
        .fields()
        .filter_map(|(name, value)| encode_value(value).map(|v| (name.clone(), v)))
        .collect()
}

fn encode_value(value: &FieldValue) -> Option<Value> {
    let encoded = match value {
        FieldValue::Null => json!({ "nullValue": null }),
        FieldValue::Boolean(b) => json!({ "booleanValue": b }),
        FieldValue::Integer(i) => json!({ "integerValue": i.to_string() }),
        FieldValue::Double(d) => json!({ "doubleValue": d }),
        FieldValue::String(s) => json!({ "stringValue": s }),
        FieldValue::Timestamp(ts) => {
            json!({ "timestampValue": ts.to_rfc3339_opts(SecondsFormat::Micros, true) })
        }
        FieldValue::ServerTimestamp => return None,
    };
    Some(encoded)
}

fn decode_fields(fields: &Map<String, Value>) -> Document {
    fields
        .iter()
        .filter_map(|(name, value)| match decode_value(value) {
            Some(decoded) => Some((name.clone(), decoded)),
            None => {
                trace!(field = %name, "Skipping unsupported Firestore value");
                None
            }
        })
        .collect()
}

fn decode_value(value: &Value) -> Option<FieldValue> {
    let (kind, inner) = value.as_object()?.iter().next()?;
    match kind.as_str() {
        "nullValue" => Some(FieldValue::Null),
        "booleanValue" => inner.as_bool().map(FieldValue::Boolean),
        "integerValue" => match inner {
            Value::String(s) => s.parse().ok(),
            other => other.as_i64(),
        }
        .map(FieldValue::Integer),
        "doubleValue" => match inner {
            // NaN and infinities arrive as strings
            Value::String(s) => s.parse().ok(),
            other => other.as_f64(),
        }
        .map(FieldValue::Double),
        "stringValue" => inner.as_str().map(|s| FieldValue::String(s.to_string())),
        "timestampValue" => inner
            .as_str()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|ts| FieldValue::Timestamp(ts.with_timezone(&Utc))),
        _ => None,
    }
}
