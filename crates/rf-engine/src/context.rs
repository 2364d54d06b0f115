//! Service context shared by every engine operation.

use std::sync::Arc;

use rf_core::traits::{AuthProvider, DocumentStore, MediaStore};

/// Handles to the backing services, constructed once by the application
/// shell and passed down explicitly.
#[derive(Clone)]
pub struct Services {
    pub store: Arc<dyn DocumentStore>,
    pub media: Arc<dyn MediaStore>,
    pub auth: Arc<dyn AuthProvider>,
}

impl Services {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        media: Arc<dyn MediaStore>,
        auth: Arc<dyn AuthProvider>,
    ) -> Self {
        Self { store, media, auth }
    }
}
