//! Document database client.
//!
//! The document store exposes the three primitives the services need: a
//! single-document get by key, a point query (field equality plus an optional
//! in-set filter on a second field), and an atomic batched write grouping
//! merge-sets and deletes into one commit.

use async_trait::async_trait;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use smartmess_common::{AppError, AppResult};

/// A document fetched from the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Document key within its collection.
    pub id: String,
    /// Document fields.
    pub data: Value,
}

impl Document {
    /// Decode the document fields into a typed model.
    pub fn decode<T: DeserializeOwned>(&self) -> AppResult<T> {
        serde_json::from_value(self.data.clone())
            .map_err(|e| AppError::DocumentStore(format!("Malformed document {}: {e}", self.id)))
    }
}

/// A point query: one equality filter, optionally combined with an in-set
/// filter on a second field.
#[derive(Debug, Clone, Serialize)]
pub struct Query {
    /// Collection to query.
    pub collection: String,
    /// Field the equality filter applies to.
    pub field: String,
    /// Value the field must equal.
    pub value: Value,
    /// Optional `(field, allowed values)` in-set filter.
    pub in_set: Option<(String, Vec<Value>)>,
}

impl Query {
    /// Create an equality query.
    pub fn eq(collection: &str, field: &str, value: impl Into<Value>) -> Self {
        Self {
            collection: collection.to_string(),
            field: field.to_string(),
            value: value.into(),
            in_set: None,
        }
    }

    /// Add an in-set filter on a second field.
    #[must_use]
    pub fn and_in(mut self, field: &str, values: impl IntoIterator<Item = impl Into<Value>>) -> Self {
        self.in_set = Some((
            field.to_string(),
            values.into_iter().map(Into::into).collect(),
        ));
        self
    }
}

/// A single staged write operation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase", tag = "op")]
pub enum WriteOp {
    /// Merge the given fields into the document, creating it if absent.
    /// Existing fields not named in `data` are left untouched.
    MergeSet {
        collection: String,
        key: String,
        data: Value,
    },
    /// Delete the document.
    Delete { collection: String, key: String },
}

/// A batch of writes committed atomically.
#[derive(Debug, Clone, Default, Serialize)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    /// Create an empty batch.
    #[must_use]
    pub const fn new() -> Self {
        Self { ops: Vec::new() }
    }

    /// Stage a merge-set.
    pub fn merge_set(&mut self, collection: &str, key: &str, data: Value) {
        self.ops.push(WriteOp::MergeSet {
            collection: collection.to_string(),
            key: key.to_string(),
            data,
        });
    }

    /// Stage a delete.
    pub fn delete(&mut self, collection: &str, key: &str) {
        self.ops.push(WriteOp::Delete {
            collection: collection.to_string(),
            key: key.to_string(),
        });
    }

    /// Number of staged operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Whether the batch has no staged operations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// The staged operations, in staging order.
    #[must_use]
    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }
}

/// Document store backend trait.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Get a single document by key. Absent documents are `None`, not errors.
    async fn get(&self, collection: &str, key: &str) -> AppResult<Option<Document>>;

    /// Run a point query.
    async fn query(&self, query: &Query) -> AppResult<Vec<Document>>;

    /// Commit a batch of writes atomically. An empty batch is a no-op.
    async fn commit(&self, batch: WriteBatch) -> AppResult<()>;
}

/// HTTP backend speaking the document database's REST API.
pub struct HttpDocumentStore {
    client: reqwest::Client,
    base_url: String,
    database: String,
}

impl HttpDocumentStore {
    /// Create a new HTTP document store client.
    #[allow(clippy::expect_used)] // Client build only fails with incompatible TLS settings
    pub fn new(base_url: &str, database: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            database: database.to_string(),
        }
    }

    fn document_url(&self, collection: &str, key: &str) -> String {
        format!(
            "{}/v1/databases/{}/collections/{collection}/documents/{key}",
            self.base_url, self.database
        )
    }

    fn rpc_url(&self, method: &str) -> String {
        format!("{}/v1/databases/{}:{method}", self.base_url, self.database)
    }
}

#[async_trait]
impl DocumentStore for HttpDocumentStore {
    async fn get(&self, collection: &str, key: &str) -> AppResult<Option<Document>> {
        let response = self
            .client
            .get(self.document_url(collection, key))
            .send()
            .await
            .map_err(|e| AppError::DocumentStore(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let response = response
            .error_for_status()
            .map_err(|e| AppError::DocumentStore(e.to_string()))?;

        let data: Value = response
            .json()
            .await
            .map_err(|e| AppError::DocumentStore(e.to_string()))?;

        Ok(Some(Document {
            id: key.to_string(),
            data,
        }))
    }

    async fn query(&self, query: &Query) -> AppResult<Vec<Document>> {
        let response = self
            .client
            .post(self.rpc_url("query"))
            .json(query)
            .send()
            .await
            .map_err(|e| AppError::DocumentStore(e.to_string()))?
            .error_for_status()
            .map_err(|e| AppError::DocumentStore(e.to_string()))?;

        response
            .json::<Vec<Document>>()
            .await
            .map_err(|e| AppError::DocumentStore(e.to_string()))
    }

    async fn commit(&self, batch: WriteBatch) -> AppResult<()> {
        if batch.is_empty() {
            return Ok(());
        }

        self.client
            .post(self.rpc_url("commit"))
            .json(&batch)
            .send()
            .await
            .map_err(|e| AppError::DocumentStore(e.to_string()))?
            .error_for_status()
            .map_err(|e| AppError::DocumentStore(e.to_string()))?;

        Ok(())
    }
}
