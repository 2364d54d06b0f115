//! # Core Traits (Ports)
//!
//! Any backing-service adapter must implement these traits to be wired into
//! the engine. All of them return `anyhow::Result` at the boundary; the
//! engine maps failures into the `AppError` taxonomy.

use async_trait::async_trait;
use bytes::Bytes;
#[cfg(feature = "testing")]
use mockall::automock;
use tokio::sync::watch;

use crate::models::Document;

/// Document persistence contract. Collections are addressed by name and hold
/// schemaless field bags; ids are assigned by the store on `create`.
#[cfg_attr(feature = "testing", automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Every document in the collection, in the store's natural order.
    async fn fetch_all(&self, collection: &str) -> anyhow::Result<Vec<Document>>;

    async fn fetch_by_id(&self, collection: &str, id: &str) -> anyhow::Result<Option<Document>>;

    /// Documents whose top-level `field` equals `value`.
    async fn fetch_where(
        &self,
        collection: &str,
        field: &str,
        value: &serde_json::Value,
    ) -> anyhow::Result<Vec<Document>>;

    /// Writes a new document and returns the assigned id.
    async fn create(&self, collection: &str, fields: serde_json::Value) -> anyhow::Result<String>;

    /// Shallow-merges `fields` into the document's top-level keys.
    async fn update(
        &self,
        collection: &str,
        id: &str,
        fields: serde_json::Value,
    ) -> anyhow::Result<()>;

    async fn delete(&self, collection: &str, id: &str) -> anyhow::Result<()>;
}

/// Blob storage contract for listing images.
#[cfg_attr(feature = "testing", automock)]
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Persists `data` under `path` and returns a retrievable URL.
    ///
    /// When `progress` is supplied the adapter reports percentages
    /// (0.0–100.0) as the upload advances; the final URL is only returned
    /// once the blob is fully persisted, so callers can safely write it
    /// into a document without dangling references.
    async fn save_upload(
        &self,
        path: &str,
        data: Bytes,
        progress: Option<watch::Sender<f32>>,
    ) -> anyhow::Result<String>;
}

/// The signed-in account, as reported by the identity service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: String,
    pub display_name: Option<String>,
    pub email: String,
}

impl Account {
    /// Name shown on messages: display name when set, email otherwise.
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.email)
    }
}

/// Identity contract. Sign-in, sign-out and registration are adapter
/// concerns; the engine only ever asks who is signed in right now.
#[cfg_attr(feature = "testing", automock)]
pub trait AuthProvider: Send + Sync {
    fn current_account(&self) -> Option<Account>;
}
