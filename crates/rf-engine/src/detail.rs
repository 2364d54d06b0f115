//! # Listing detail
//!
//! A single listing plus its message thread. Messages are kept in fetch
//! order and refetched after a successful send, mirroring how the board
//! presents them.

use chrono::Utc;
use tracing::{debug, warn};

use rf_core::collections;
use rf_core::error::{AppError, Result};
use rf_core::models::{encode_fields, Message};
use rf_core::Listing;

use crate::context::Services;

pub struct ListingDetail {
    services: Services,
    pub listing: Listing,
    pub messages: Vec<Message>,
}

impl ListingDetail {
    /// Loads the listing and its messages. A missing listing is `NotFound`.
    pub async fn load(services: Services, listing_id: &str) -> Result<Self> {
        let doc = services
            .store
            .fetch_by_id(collections::APARTMENTS, listing_id)
            .await
            .map_err(AppError::store)?
            .ok_or_else(|| AppError::NotFound("listing", listing_id.to_string()))?;
        let listing: Listing = doc.decode()?;
        let messages = fetch_messages(&services, listing_id).await?;
        debug!(listing_id, count = messages.len(), "loaded listing detail");
        Ok(Self {
            services,
            listing,
            messages,
        })
    }

    /// Posts a message to the listing's thread as the signed-in account and
    /// refreshes the local thread. Blank bodies are rejected before any
    /// store call; an unauthenticated caller changes nothing.
    pub async fn send_message(&mut self, body: &str) -> Result<()> {
        let account = self
            .services
            .auth
            .current_account()
            .ok_or_else(|| AppError::Unauthenticated("sign in to send a message".into()))?;
        let body = body.trim();
        if body.is_empty() {
            return Err(AppError::Validation("message must not be empty".into()));
        }

        let message = Message {
            id: String::new(),
            apartment_id: self.listing.id.clone(),
            user_id: account.id.clone(),
            user_name: account.label().to_string(),
            message: body.to_string(),
            timestamp: Utc::now(),
        };
        self.services
            .store
            .create(collections::MESSAGES, encode_fields(&message)?)
            .await
            .map_err(AppError::store)?;

        self.messages = fetch_messages(&self.services, &self.listing.id).await?;
        Ok(())
    }
}

async fn fetch_messages(services: &Services, listing_id: &str) -> Result<Vec<Message>> {
    let docs = services
        .store
        .fetch_where(
            collections::MESSAGES,
            "apartmentId",
            &serde_json::Value::String(listing_id.to_string()),
        )
        .await
        .map_err(AppError::store)?;
    Ok(docs
        .iter()
        .filter_map(|doc| match doc.decode::<Message>() {
            Ok(message) => Some(message),
            Err(err) => {
                warn!(id = %doc.id, %err, "skipping undecodable message");
                None
            }
        })
        .collect())
}
