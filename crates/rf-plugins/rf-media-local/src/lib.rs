//! # rf-media-local
//! Local filesystem implementation of `MediaStore`.
//! Features: content-addressable storage, directory sharding, image-type
//! validation, and chunked writes so upload progress can be reported.

use std::io::Cursor;
use std::path::PathBuf;

use async_trait::async_trait;
use bytes::Bytes;
use image::ImageReader;
use rf_core::traits::MediaStore;
use sha2::{Digest, Sha256};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::watch;
use tracing::debug;

const WRITE_CHUNK: usize = 64 * 1024;

pub struct LocalMediaStore {
    /// Root directory for all uploads (e.g., "./data/uploads")
    root_path: PathBuf,
    /// Public URL prefix (e.g., "/static/uploads")
    url_prefix: String,
}

impl LocalMediaStore {
    pub fn new(root: PathBuf, url_prefix: String) -> Self {
        Self {
            root_path: root,
            url_prefix,
        }
    }

    /// Generates a sharded path: "ab/cd/abcdef...hash"
    fn sharded_path(&self, hash: &str) -> PathBuf {
        let mut path = self.root_path.clone();
        path.push(&hash[0..2]);
        path.push(&hash[2..4]);
        path.push(hash);
        path
    }

    fn url_for(&self, hash: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            self.url_prefix,
            &hash[0..2],
            &hash[2..4],
            hash
        )
    }
}

#[async_trait]
impl MediaStore for LocalMediaStore {
    /// Saves an upload under its SHA-256 hash, which deduplicates blobs.
    /// The logical `path` the caller requested is kept for the logs only.
    ///
    /// Rejects anything the image sniffer cannot identify; listing images
    /// are the only blobs this adapter handles.
    async fn save_upload(
        &self,
        path: &str,
        data: Bytes,
        progress: Option<watch::Sender<f32>>,
    ) -> anyhow::Result<String> {
        if ImageReader::new(Cursor::new(&data))
            .with_guessed_format()?
            .format()
            .is_none()
        {
            anyhow::bail!("upload is not a recognizable image");
        }

        let mut hasher = Sha256::new();
        hasher.update(&data);
        let hash = format!("{:x}", hasher.finalize());

        let target = self.sharded_path(&hash);
        let parent = target
            .parent()
            .ok_or_else(|| anyhow::anyhow!("upload root has no parent"))?;
        fs::create_dir_all(parent).await?;

        if !target.exists() {
            let mut file = fs::File::create(&target).await?;
            let total = data.len().max(1);
            let mut written = 0usize;
            for chunk in data.chunks(WRITE_CHUNK) {
                file.write_all(chunk).await?;
                written += chunk.len();
                if let Some(tx) = &progress {
                    tx.send_replace(written as f32 / total as f32 * 100.0);
                }
            }
            file.flush().await?;
        } else if let Some(tx) = &progress {
            // Deduplicated: the blob is already fully persisted.
            tx.send_replace(100.0);
        }

        debug!(logical = path, hash, "upload stored");
        Ok(self.url_for(&hash))
    }
}
