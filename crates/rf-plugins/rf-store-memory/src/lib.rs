//! # rf-store-memory
//!
//! In-memory implementation of `DocumentStore`. Used by tests and demo
//! shells; documents live in a mutex-guarded map of collections and ids are
//! random UUIDs, insertion order preserved per collection the way the real
//! store returns them.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use rf_core::models::Document;
use rf_core::traits::DocumentStore;
use uuid::Uuid;

#[derive(Default)]
pub struct MemoryDocumentStore {
    // collection name -> ordered (id, fields) pairs
    collections: Mutex<HashMap<String, Vec<(String, serde_json::Value)>>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a document under a caller-chosen id. Test convenience; the
    /// trait's `create` assigns random ids.
    pub fn seed(&self, collection: &str, id: &str, fields: serde_json::Value) {
        let mut collections = self.collections.lock().expect("store poisoned");
        collections
            .entry(collection.to_string())
            .or_default()
            .push((id.to_string(), fields));
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn fetch_all(&self, collection: &str) -> anyhow::Result<Vec<Document>> {
        let collections = self.collections.lock().expect("store poisoned");
        Ok(collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, fields)| Document::new(id.clone(), fields.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn fetch_by_id(&self, collection: &str, id: &str) -> anyhow::Result<Option<Document>> {
        let collections = self.collections.lock().expect("store poisoned");
        Ok(collections.get(collection).and_then(|docs| {
            docs.iter()
                .find(|(doc_id, _)| doc_id == id)
                .map(|(id, fields)| Document::new(id.clone(), fields.clone()))
        }))
    }

    async fn fetch_where(
        &self,
        collection: &str,
        field: &str,
        value: &serde_json::Value,
    ) -> anyhow::Result<Vec<Document>> {
        let collections = self.collections.lock().expect("store poisoned");
        Ok(collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|(_, fields)| fields.get(field) == Some(value))
                    .map(|(id, fields)| Document::new(id.clone(), fields.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn create(&self, collection: &str, fields: serde_json::Value) -> anyhow::Result<String> {
        let id = Uuid::new_v4().to_string();
        let mut collections = self.collections.lock().expect("store poisoned");
        collections
            .entry(collection.to_string())
            .or_default()
            .push((id.clone(), fields));
        Ok(id)
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        fields: serde_json::Value,
    ) -> anyhow::Result<()> {
        let mut collections = self.collections.lock().expect("store poisoned");
        let docs = collections
            .get_mut(collection)
            .ok_or_else(|| anyhow::anyhow!("no such collection: {collection}"))?;
        let (_, existing) = docs
            .iter_mut()
            .find(|(doc_id, _)| doc_id == id)
            .ok_or_else(|| anyhow::anyhow!("no such document: {collection}/{id}"))?;
        // Shallow merge of top-level keys, matching the port contract.
        if let (Some(target), Some(patch)) = (existing.as_object_mut(), fields.as_object()) {
            for (key, value) in patch {
                target.insert(key.clone(), value.clone());
            }
        } else {
            *existing = fields;
        }
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> anyhow::Result<()> {
        let mut collections = self.collections.lock().expect("store poisoned");
        if let Some(docs) = collections.get_mut(collection) {
            docs.retain(|(doc_id, _)| doc_id != id);
        }
        Ok(())
    }
}
