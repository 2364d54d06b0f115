//! # rf-store-sqlite
//!
//! SQLite-backed implementation of `DocumentStore`. Documents are schemaless
//! JSON blobs in a single `documents` table keyed by (collection, id);
//! insertion order is the rowid, which is what "the store's natural order"
//! means for this adapter.

use async_trait::async_trait;
use rf_core::models::Document;
use rf_core::traits::DocumentStore;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use uuid::Uuid;

pub struct SqliteDocumentStore {
    pool: SqlitePool,
}

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS documents (
    collection TEXT NOT NULL,
    id         TEXT NOT NULL,
    fields     TEXT NOT NULL,
    PRIMARY KEY (collection, id)
)";

impl SqliteDocumentStore {
    pub async fn new(url: &str) -> anyhow::Result<Self> {
        let pool = SqlitePoolOptions::new().max_connections(5).connect(url).await?;
        sqlx::query(SCHEMA).execute(&pool).await?;
        Ok(Self { pool })
    }

    /// A private in-memory database. One connection only: every pooled
    /// connection to `sqlite::memory:` would otherwise get its own empty db.
    pub async fn in_memory() -> anyhow::Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        sqlx::query(SCHEMA).execute(&pool).await?;
        Ok(Self { pool })
    }

    fn row_to_document(row: &sqlx::sqlite::SqliteRow) -> anyhow::Result<Document> {
        let id: String = row.get("id");
        let fields: serde_json::Value = serde_json::from_str(&row.get::<String, _>("fields"))?;
        Ok(Document::new(id, fields))
    }
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    async fn fetch_all(&self, collection: &str) -> anyhow::Result<Vec<Document>> {
        let rows = sqlx::query("SELECT id, fields FROM documents WHERE collection = ? ORDER BY rowid")
            .bind(collection)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(Self::row_to_document).collect()
    }

    async fn fetch_by_id(&self, collection: &str, id: &str) -> anyhow::Result<Option<Document>> {
        let row = sqlx::query("SELECT id, fields FROM documents WHERE collection = ? AND id = ?")
            .bind(collection)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(Self::row_to_document).transpose()
    }

    async fn fetch_where(
        &self,
        collection: &str,
        field: &str,
        value: &serde_json::Value,
    ) -> anyhow::Result<Vec<Document>> {
        // Equality on a top-level key; filtered here rather than leaning on
        // the JSON1 extension so the adapter works on any SQLite build.
        let all = self.fetch_all(collection).await?;
        Ok(all
            .into_iter()
            .filter(|doc| doc.fields.get(field) == Some(value))
            .collect())
    }

    async fn create(&self, collection: &str, fields: serde_json::Value) -> anyhow::Result<String> {
        let id = Uuid::new_v4().to_string();
        sqlx::query("INSERT INTO documents (collection, id, fields) VALUES (?, ?, ?)")
            .bind(collection)
            .bind(&id)
            .bind(serde_json::to_string(&fields)?)
            .execute(&self.pool)
            .await?;
        Ok(id)
    }

    /// Shallow merge of top-level keys, inside a transaction so a concurrent
    /// writer can't interleave between the read and the write.
    async fn update(
        &self,
        collection: &str,
        id: &str,
        fields: serde_json::Value,
    ) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query("SELECT fields FROM documents WHERE collection = ? AND id = ?")
            .bind(collection)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| anyhow::anyhow!("no such document: {collection}/{id}"))?;
        let mut existing: serde_json::Value = serde_json::from_str(&row.get::<String, _>("fields"))?;

        if let (Some(target), Some(patch)) = (existing.as_object_mut(), fields.as_object()) {
            for (key, value) in patch {
                target.insert(key.clone(), value.clone());
            }
        } else {
            existing = fields;
        }

        sqlx::query("UPDATE documents SET fields = ? WHERE collection = ? AND id = ?")
            .bind(serde_json::to_string(&existing)?)
            .bind(collection)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM documents WHERE collection = ? AND id = ?")
            .bind(collection)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
