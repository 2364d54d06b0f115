//! # rf-configs
//!
//! Typed configuration for the adapter crates. Values come from the
//! environment (prefix `RF_`), with a `.env` file honored in development.
//! Connection credentials for a hosted document store would layer on here;
//! the in-tree adapters only need paths and a database URL.

use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("configuration error: {0}")]
    Load(#[from] config::ConfigError),
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// SQLite database URL for the document-store adapter.
    pub database_url: String,
    /// Root directory the local media adapter writes blobs under.
    pub media_root: PathBuf,
    /// Public URL prefix the local media adapter mints URLs with.
    pub media_url_prefix: String,
}

impl AppConfig {
    /// Loads configuration from the environment, falling back to development
    /// defaults. `RF_DATABASE_URL`, `RF_MEDIA_ROOT` and `RF_MEDIA_URL_PREFIX`
    /// override.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let cfg = config::Config::builder()
            .set_default("database_url", "sqlite:rusty_flats.db")?
            .set_default("media_root", "./data/uploads")?
            .set_default("media_url_prefix", "/static/uploads")?
            .add_source(config::Environment::with_prefix("RF"))
            .build()?;

        let cfg: AppConfig = cfg.try_deserialize()?;
        debug!(?cfg, "configuration loaded");
        Ok(cfg)
    }
}
