//! In-memory store backends.
//!
//! These keep the full query and batched-write semantics of the HTTP
//! backends in process memory. They serve local development and are the test
//! doubles the service tests run against.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use serde_json::Value;
use smartmess_common::{AppError, AppResult};

use crate::documents::{Document, DocumentStore, Query, WriteBatch, WriteOp};
use crate::identity::{CallerIdentity, IdentityRecord, IdentityStore};

type Collections = HashMap<String, BTreeMap<String, Value>>;

/// In-memory document store backend.
#[derive(Default)]
pub struct MemoryDocumentStore {
    data: RwLock<Collections>,
    commit_count: AtomicU64,
}

impl MemoryDocumentStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a document directly, outside any batch.
    pub fn insert(&self, collection: &str, key: &str, data: Value) {
        self.write_data()
            .entry(collection.to_string())
            .or_default()
            .insert(key.to_string(), data);
    }

    /// Number of batches committed so far.
    #[must_use]
    pub fn commit_count(&self) -> u64 {
        self.commit_count.load(Ordering::SeqCst)
    }

    /// Number of documents currently in a collection.
    #[must_use]
    pub fn collection_len(&self, collection: &str) -> usize {
        self.read_data()
            .get(collection)
            .map_or(0, BTreeMap::len)
    }

    fn read_data(&self) -> RwLockReadGuard<'_, Collections> {
        self.data.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_data(&self) -> RwLockWriteGuard<'_, Collections> {
        self.data.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn matches(data: &Value, query: &Query) -> bool {
    if data.get(&query.field) != Some(&query.value) {
        return false;
    }
    if let Some((field, allowed)) = &query.in_set {
        return data
            .get(field)
            .is_some_and(|value| allowed.contains(value));
    }
    true
}

/// Merge `patch` into `target` one level deep, the way a merge-set write
/// behaves on the wire: named top-level fields replace, unnamed ones survive.
fn merge_into(target: &mut Value, patch: Value) {
    match (target.as_object_mut(), patch) {
        (Some(existing), Value::Object(fields)) => {
            for (key, value) in fields {
                existing.insert(key, value);
            }
        }
        (_, patch) => *target = patch,
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, collection: &str, key: &str) -> AppResult<Option<Document>> {
        Ok(self
            .read_data()
            .get(collection)
            .and_then(|docs| docs.get(key))
            .map(|data| Document {
                id: key.to_string(),
                data: data.clone(),
            }))
    }

    async fn query(&self, query: &Query) -> AppResult<Vec<Document>> {
        Ok(self
            .read_data()
            .get(&query.collection)
            .map(|docs| {
                docs.iter()
                    .filter(|(_, data)| matches(data, query))
                    .map(|(id, data)| Document {
                        id: id.clone(),
                        data: data.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn commit(&self, batch: WriteBatch) -> AppResult<()> {
        if batch.is_empty() {
            return Ok(());
        }

        // One write lock for the whole batch keeps it indivisible to readers.
        let mut data = self.write_data();
        for op in batch.ops() {
            match op {
                WriteOp::MergeSet {
                    collection,
                    key,
                    data: fields,
                } => {
                    let docs = data.entry(collection.clone()).or_default();
                    match docs.get_mut(key) {
                        Some(existing) => merge_into(existing, fields.clone()),
                        None => {
                            docs.insert(key.clone(), fields.clone());
                        }
                    }
                }
                WriteOp::Delete { collection, key } => {
                    if let Some(docs) = data.get_mut(collection) {
                        docs.remove(key);
                    }
                }
            }
        }
        drop(data);

        self.commit_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// In-memory identity store backend.
#[derive(Default)]
pub struct MemoryIdentityStore {
    identities: RwLock<HashMap<String, IdentityRecord>>,
    tokens: RwLock<HashMap<String, CallerIdentity>>,
    deleted: RwLock<Vec<String>>,
}

impl MemoryIdentityStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an identity record.
    pub fn insert(&self, email: &str, uid: &str) {
        self.identities
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                email.to_string(),
                IdentityRecord {
                    uid: uid.to_string(),
                    email: email.to_string(),
                },
            );
    }

    /// Register a bearer token for a caller.
    pub fn register_token(&self, token: &str, uid: &str, email: &str) {
        self.tokens
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                token.to_string(),
                CallerIdentity {
                    uid: uid.to_string(),
                    email: email.to_string(),
                },
            );
    }

    /// The `uid`s deleted so far, in deletion order.
    #[must_use]
    pub fn deleted_uids(&self) -> Vec<String> {
        self.deleted
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl IdentityStore for MemoryIdentityStore {
    async fn verify_token(&self, token: &str) -> AppResult<Option<CallerIdentity>> {
        Ok(self
            .tokens
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(token)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<IdentityRecord>> {
        Ok(self
            .identities
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(email)
            .cloned())
    }

    async fn delete(&self, uid: &str) -> AppResult<()> {
        let mut identities = self
            .identities
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        let email = identities
            .iter()
            .find(|(_, record)| record.uid == uid)
            .map(|(email, _)| email.clone())
            .ok_or_else(|| AppError::IdentityStore(format!("No identity with uid {uid}")))?;

        identities.remove(&email);
        drop(identities);

        self.deleted
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(uid.to_string());
        Ok(())
    }
}
