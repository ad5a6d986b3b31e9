//! Document sinks
//!
//! Completed assessments are appended as JSON documents to a named
//! collection. Three backends:
//!
//! - [`MemorySink`]: process memory, for tests and local runs
//! - [`JsonLinesSink`]: one line per document in a local file
//! - [`FirestoreSink`]: Firestore REST `createDocument`

use crate::error::SinkError;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use ulid::Ulid;

/// Append-only document store
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait DocumentSink: Send + Sync {
    /// Append a document, returning its id
    async fn append(&self, collection: &str, document: &Value) -> Result<String, SinkError>;

    /// Backend name for logs
    fn name(&self) -> &'static str;
}

/// In-memory sink
#[derive(Debug, Default)]
pub struct MemorySink {
    collections: DashMap<String, Vec<(String, Value)>>,
}

impl MemorySink {
    /// Create new empty sink
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Documents in a collection, oldest first
    #[must_use]
    pub fn documents(&self, collection: &str) -> Vec<Value> {
        self.collections
            .get(collection)
            .map(|docs| docs.iter().map(|(_, doc)| doc.clone()).collect())
            .unwrap_or_default()
    }

    /// Document by id
    #[must_use]
    pub fn get(&self, collection: &str, id: &str) -> Option<Value> {
        self.collections
            .get(collection)?
            .iter()
            .find(|(doc_id, _)| doc_id == id)
            .map(|(_, doc)| doc.clone())
    }

    /// Number of documents across all collections
    #[must_use]
    pub fn len(&self) -> usize {
        self.collections.iter().map(|c| c.value().len()).sum()
    }

    /// Check if nothing has been appended
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait::async_trait]
impl DocumentSink for MemorySink {
    async fn append(&self, collection: &str, document: &Value) -> Result<String, SinkError> {
        let id = Ulid::new().to_string();
        self.collections
            .entry(collection.to_string())
            .or_default()
            .push((id.clone(), document.clone()));
        Ok(id)
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

/// One stored line of a [`JsonLinesSink`] file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredLine {
    /// Generated document id
    pub id: String,
    /// Target collection
    pub collection: String,
    /// Stored document
    pub document: Value,
}

/// Appends documents to a local file, one JSON object per line
#[derive(Debug)]
pub struct JsonLinesSink {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonLinesSink {
    /// Create sink writing to `path`; the file is created on first append
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Target file
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every stored line back
    ///
    /// # Errors
    /// Returns [`SinkError::Io`] or [`SinkError::Encode`] for an unreadable
    /// file or a corrupt line
    pub async fn read_all(&self) -> Result<Vec<StoredLine>, SinkError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(SinkError::from))
            .collect()
    }
}

#[async_trait::async_trait]
impl DocumentSink for JsonLinesSink {
    async fn append(&self, collection: &str, document: &Value) -> Result<String, SinkError> {
        let line = StoredLine {
            id: Ulid::new().to_string(),
            collection: collection.to_string(),
            document: document.clone(),
        };
        let mut bytes = serde_json::to_vec(&line)?;
        bytes.push(b'\n');

        let _guard = self.lock.lock().await;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(&bytes).await?;
        file.flush().await?;
        Ok(line.id)
    }

    fn name(&self) -> &'static str {
        "jsonl"
    }
}

/// Firestore REST sink
#[derive(Debug, Clone)]
pub struct FirestoreSink {
    client: reqwest::Client,
    project_id: String,
    api_key: Option<String>,
    base_url: String,
}

impl FirestoreSink {
    /// Create sink for a project
    ///
    /// # Errors
    /// Returns [`SinkError::Config`] for a blank project id
    pub fn new(project_id: impl Into<String>, api_key: Option<String>) -> Result<Self, SinkError> {
        let project_id = project_id.into();
        if project_id.trim().is_empty() {
            return Err(SinkError::Config("firestore project id is empty".to_string()));
        }
        Ok(Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            project_id,
            api_key,
            base_url: "https://firestore.googleapis.com/v1".to_string(),
        })
    }

    /// With request timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        self
    }

    /// With a different API root (emulator)
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// `createDocument` URL for a collection
    #[must_use]
    pub fn collection_url(&self, collection: &str) -> String {
        format!(
            "{}/projects/{}/databases/(default)/documents/{}",
            self.base_url, self.project_id, collection
        )
    }
}

#[async_trait::async_trait]
impl DocumentSink for FirestoreSink {
    async fn append(&self, collection: &str, document: &Value) -> Result<String, SinkError> {
        let body = encode_document(document)?;
        let mut request = self.client.post(self.collection_url(collection)).json(&body);
        if let Some(key) = &self.api_key {
            request = request.query(&[("key", key)]);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SinkError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let created: Value = response.json().await?;
        let id = created
            .get("name")
            .and_then(Value::as_str)
            .and_then(|name| name.rsplit('/').next())
            .unwrap_or_default()
            .to_string();
        tracing::debug!(collection, id = %id, "created firestore document");
        Ok(id)
    }

    fn name(&self) -> &'static str {
        "firestore"
    }
}

/// Encode a JSON object as a Firestore document body
///
/// # Errors
/// Returns [`SinkError::Config`] unless the value is an object
pub fn encode_document(document: &Value) -> Result<Value, SinkError> {
    match document {
        Value::Object(map) => Ok(json!({ "fields": encode_fields(map) })),
        _ => Err(SinkError::Config(
            "firestore documents must be JSON objects".to_string(),
        )),
    }
}

fn encode_fields(map: &Map<String, Value>) -> Map<String, Value> {
    map.iter()
        .map(|(key, value)| (key.clone(), encode_value(value)))
        .collect()
}

/// Encode one JSON value as a Firestore typed value
///
/// RFC 3339 strings become `timestampValue`.
#[must_use]
pub fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => match n.as_i64() {
            Some(i) => json!({ "integerValue": i.to_string() }),
            None => json!({ "doubleValue": n.as_f64() }),
        },
        Value::String(s) if chrono::DateTime::parse_from_rfc3339(s).is_ok() => {
            json!({ "timestampValue": s })
        }
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => json!({
            "arrayValue": { "values": items.iter().map(encode_value).collect::<Vec<_>>() }
        }),
        Value::Object(map) => json!({ "mapValue": { "fields": encode_fields(map) } }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn memory_sink_keeps_collections_apart() {
        let sink = MemorySink::new();
        assert!(sink.is_empty());
        let id = sink.append("assessments", &json!({"a": 1})).await.unwrap();
        sink.append("other", &json!({"b": 2})).await.unwrap();

        assert_eq!(sink.len(), 2);
        assert_eq!(sink.documents("assessments"), vec![json!({"a": 1})]);
        assert_eq!(sink.get("assessments", &id), Some(json!({"a": 1})));
        assert!(sink.get("other", &id).is_none());
    }

    #[test]
    fn typed_value_encoding() {
        let encoded = encode_document(&json!({
            "name": "Maya",
            "age": 8,
            "score": 2.5,
            "mobile": false,
            "note": null,
            "timestamp": "2025-05-01T10:00:00Z",
            "tags": ["a"],
            "prefs": {"weeklyTips": true}
        }))
        .unwrap();
        let fields = &encoded["fields"];
        assert_eq!(fields["name"], json!({"stringValue": "Maya"}));
        assert_eq!(fields["age"], json!({"integerValue": "8"}));
        assert_eq!(fields["score"], json!({"doubleValue": 2.5}));
        assert_eq!(fields["mobile"], json!({"booleanValue": false}));
        assert_eq!(fields["note"], json!({"nullValue": null}));
        assert_eq!(fields["timestamp"], json!({"timestampValue": "2025-05-01T10:00:00Z"}));
        assert_eq!(
            fields["tags"],
            json!({"arrayValue": {"values": [{"stringValue": "a"}]}})
        );
        assert_eq!(
            fields["prefs"],
            json!({"mapValue": {"fields": {"weeklyTips": {"booleanValue": true}}}})
        );
    }

    #[test]
    fn only_objects_are_documents() {
        assert!(matches!(encode_document(&json!([1])), Err(SinkError::Config(_))));
    }

    #[test]
    fn firestore_urls() {
        assert!(FirestoreSink::new(" ", None).is_err());
        let sink = FirestoreSink::new("v-leap", None)
            .unwrap()
            .with_base_url("http://localhost:8081/v1/");
        assert_eq!(
            sink.collection_url("assessments"),
            "http://localhost:8081/v1/projects/v-leap/databases/(default)/documents/assessments"
        );
    }
}
