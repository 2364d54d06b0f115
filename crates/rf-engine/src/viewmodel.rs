//! # Listing View-Model
//!
//! Owns the raw listing set, the favorite set and the filter criteria, and
//! publishes the derived view over a watch channel after every recomputation.
//! Mutations that touch the store are optimistic: local state changes first,
//! the round-trip follows, and a failed round-trip rolls the local change
//! back before the error surfaces.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use bytes::Bytes;
use tokio::sync::watch;
use tracing::{debug, warn};
use uuid::Uuid;

use rf_core::collections;
use rf_core::error::{AppError, Result};
use rf_core::models::{encode_fields, Document, Listing, ListingDraft, UserProfile};

use crate::context::Services;
use crate::filter::{derive_view, FilterCriteria, FilterPatch, SortKey};

#[derive(Default)]
struct State {
    listings: Vec<Listing>,
    favorites: HashSet<String>,
    criteria: FilterCriteria,
    // Per-data-class request tickets. A completed fetch is applied only if no
    // newer request for the same class has been issued since, so a slow stale
    // response can never overwrite a fresher one.
    listings_issued: u64,
    listings_applied: u64,
    favorites_issued: u64,
    favorites_applied: u64,
}

/// The live view-model. Cheap to share behind an `Arc`; all methods take
/// `&self`, and concurrent loads are resolved by the request tickets above.
pub struct ListingViewModel {
    services: Services,
    state: Mutex<State>,
    view_tx: watch::Sender<Vec<Listing>>,
}

impl ListingViewModel {
    pub fn new(services: Services) -> Self {
        let (view_tx, _) = watch::channel(Vec::new());
        Self {
            services,
            state: Mutex::new(State::default()),
            view_tx,
        }
    }

    /// Observers receive the freshly derived view after every recomputation.
    pub fn subscribe(&self) -> watch::Receiver<Vec<Listing>> {
        self.view_tx.subscribe()
    }

    /// Snapshot of the current derived view.
    pub fn view(&self) -> Vec<Listing> {
        self.view_tx.borrow().clone()
    }

    /// Snapshot of the current filter criteria.
    pub fn criteria(&self) -> FilterCriteria {
        self.state().criteria.clone()
    }

    /// Snapshot of the current favorite set.
    pub fn favorites(&self) -> HashSet<String> {
        self.state().favorites.clone()
    }

    /// Fetches the full listing set and replaces local state with it.
    /// No pagination, no incremental sync; criteria and favorites are
    /// untouched.
    pub async fn load_listings(&self) -> Result<Vec<Listing>> {
        let ticket = {
            let mut s = self.state();
            s.listings_issued += 1;
            s.listings_issued
        };

        let docs = self
            .services
            .store
            .fetch_all(collections::APARTMENTS)
            .await
            .map_err(AppError::store)?;
        let listings = decode_listings(docs);
        debug!(count = listings.len(), "loaded listings");

        let mut s = self.state();
        if ticket > s.listings_applied {
            s.listings_applied = ticket;
            s.listings = listings.clone();
            self.recompute(&s);
        }
        Ok(listings)
    }

    /// Fetches the account's favorite set, creating the profile document with
    /// an empty list the first time the account is seen. An empty account id
    /// means nobody is signed in: the local set is cleared and the store is
    /// left alone.
    pub async fn load_favorites(&self, account_id: &str) -> Result<Vec<String>> {
        if account_id.is_empty() {
            let mut s = self.state();
            // Sign-out takes a ticket too, so an authenticated fetch still in
            // flight lands stale and cannot re-apply the old account's set.
            s.favorites_issued += 1;
            s.favorites_applied = s.favorites_issued;
            s.favorites.clear();
            self.recompute(&s);
            return Ok(Vec::new());
        }

        let ticket = {
            let mut s = self.state();
            s.favorites_issued += 1;
            s.favorites_issued
        };

        let profile = self.fetch_or_create_profile(account_id).await?;
        debug!(count = profile.favorites.len(), "loaded favorites");

        let mut s = self.state();
        if ticket > s.favorites_applied {
            s.favorites_applied = ticket;
            s.favorites = profile.favorites.iter().cloned().collect();
            self.recompute(&s);
        }
        Ok(profile.favorites)
    }

    /// Merges `patch` into the criteria and recomputes the view.
    pub fn set_filter(&self, patch: FilterPatch) {
        let mut s = self.state();
        s.criteria.apply(patch);
        self.recompute(&s);
    }

    /// Restores every criteria field to its default in one step, so no
    /// partially-reset view is ever observable.
    pub fn reset_filters(&self) {
        let mut s = self.state();
        s.criteria = FilterCriteria::default();
        self.recompute(&s);
    }

    /// Restores only the sort key, leaving the filters untouched.
    pub fn reset_sort(&self) {
        let mut s = self.state();
        s.criteria.sort = SortKey::default();
        self.recompute(&s);
    }

    /// Flips the listing's membership in the account's favorite set.
    ///
    /// The local set changes and the view republishes before the round-trip;
    /// a failed round-trip flips it back. Returns whether the listing is a
    /// favorite after the toggle.
    pub async fn toggle_favorite(&self, account_id: &str, listing_id: &str) -> Result<bool> {
        if account_id.is_empty() {
            return Err(AppError::Unauthenticated(
                "sign in to add or remove favorites".into(),
            ));
        }

        let adding = {
            let mut s = self.state();
            let adding = !s.favorites.contains(listing_id);
            if adding {
                s.favorites.insert(listing_id.to_string());
            } else {
                s.favorites.remove(listing_id);
            }
            self.recompute(&s);
            adding
        };

        if let Err(err) = self.persist_favorite(account_id, listing_id, adding).await {
            warn!(listing_id, "favorite toggle failed, rolling back");
            let mut s = self.state();
            if adding {
                s.favorites.remove(listing_id);
            } else {
                s.favorites.insert(listing_id.to_string());
            }
            self.recompute(&s);
            return Err(err);
        }
        Ok(adding)
    }

    /// Deletes a listing the account owns. Ownership is re-verified against a
    /// fresh copy of the document, never the local cache, so a stale cache
    /// can't authorize the delete. The listing disappears locally before the
    /// store round-trip and reappears in its original slot if that fails.
    pub async fn delete_listing(&self, account_id: &str, listing_id: &str) -> Result<()> {
        if account_id.is_empty() {
            return Err(AppError::Unauthenticated("sign in to delete a listing".into()));
        }

        let doc = self
            .services
            .store
            .fetch_by_id(collections::APARTMENTS, listing_id)
            .await
            .map_err(AppError::store)?
            .ok_or_else(|| AppError::NotFound("listing", listing_id.to_string()))?;
        let listing: Listing = doc.decode()?;
        if listing.owner_id != account_id {
            return Err(AppError::Forbidden(
                "only the owner can delete a listing".into(),
            ));
        }

        let removed = {
            let mut s = self.state();
            let slot = s.listings.iter().position(|l| l.id == listing_id);
            let removed = slot.map(|i| (i, s.listings.remove(i)));
            if removed.is_some() {
                self.recompute(&s);
            }
            removed
        };

        if let Err(err) = self
            .services
            .store
            .delete(collections::APARTMENTS, listing_id)
            .await
            .map_err(AppError::store)
        {
            warn!(listing_id, "delete failed, restoring listing");
            if let Some((slot, listing)) = removed {
                let mut s = self.state();
                let slot = slot.min(s.listings.len());
                s.listings.insert(slot, listing);
                self.recompute(&s);
            }
            return Err(err);
        }
        debug!(listing_id, "listing deleted");
        Ok(())
    }

    /// Validates and creates a listing owned by `account_id`.
    ///
    /// Validation runs before any network activity. When image bytes are
    /// supplied the blob is persisted first and its URL written into the
    /// record, so the listing is never visible with a dangling image
    /// reference. On success the raw set gains the listing without a reload.
    pub async fn add_listing(
        &self,
        account_id: &str,
        draft: ListingDraft,
        image: Option<Bytes>,
        progress: Option<watch::Sender<f32>>,
    ) -> Result<Listing> {
        if account_id.is_empty() {
            return Err(AppError::Unauthenticated("sign in to add a listing".into()));
        }
        draft.validate()?;

        let image_url = match image {
            Some(bytes) => {
                let path = format!("apartment-images/{}", Uuid::new_v4());
                let url = self
                    .services
                    .media
                    .save_upload(&path, bytes, progress)
                    .await
                    .map_err(AppError::store)?;
                Some(url)
            }
            None => None,
        };

        let mut listing = draft.into_listing(account_id, image_url);
        let fields = encode_fields(&listing)?;
        let id = self
            .services
            .store
            .create(collections::APARTMENTS, fields)
            .await
            .map_err(AppError::store)?;
        listing.id = id;
        debug!(listing_id = %listing.id, "listing created");

        let mut s = self.state();
        s.listings.push(listing.clone());
        self.recompute(&s);
        Ok(listing)
    }

    /// The account's own listings, straight from the store and unaffected by
    /// the current filter criteria.
    pub async fn my_listings(&self, account_id: &str) -> Result<Vec<Listing>> {
        if account_id.is_empty() {
            return Err(AppError::Unauthenticated("sign in to see your listings".into()));
        }
        let docs = self
            .services
            .store
            .fetch_where(
                collections::APARTMENTS,
                "userId",
                &serde_json::Value::String(account_id.to_string()),
            )
            .await
            .map_err(AppError::store)?;
        Ok(decode_listings(docs))
    }

    async fn persist_favorite(
        &self,
        account_id: &str,
        listing_id: &str,
        adding: bool,
    ) -> Result<()> {
        // The server-side copy is authoritative for everything except the
        // toggle being applied; two sessions toggling different listings
        // must not clobber each other's sets.
        let profile = self.fetch_or_create_profile(account_id).await?;
        let mut favorites = profile.favorites;
        if adding {
            if !favorites.iter().any(|f| f == listing_id) {
                favorites.push(listing_id.to_string());
            }
        } else {
            favorites.retain(|f| f != listing_id);
        }
        self.services
            .store
            .update(
                collections::USERS,
                &profile.id,
                serde_json::json!({ "favorites": favorites }),
            )
            .await
            .map_err(AppError::store)
    }

    async fn fetch_or_create_profile(&self, account_id: &str) -> Result<UserProfile> {
        let docs = self
            .services
            .store
            .fetch_where(
                collections::USERS,
                "userId",
                &serde_json::Value::String(account_id.to_string()),
            )
            .await
            .map_err(AppError::store)?;

        if let Some(doc) = docs.first() {
            return doc.decode();
        }

        debug!(account_id, "creating profile with empty favorites");
        let mut profile = UserProfile {
            user_id: account_id.to_string(),
            ..UserProfile::default()
        };
        let id = self
            .services
            .store
            .create(collections::USERS, encode_fields(&profile)?)
            .await
            .map_err(AppError::store)?;
        profile.id = id;
        Ok(profile)
    }

    fn recompute(&self, s: &State) {
        let view = derive_view(&s.listings, &s.favorites, &s.criteria);
        self.view_tx.send_replace(view);
    }

    fn state(&self) -> MutexGuard<'_, State> {
        // Never held across an await point.
        self.state.lock().expect("view-model state poisoned")
    }
}

/// Decodes listing documents, skipping any that fail to decode. One bad
/// document must not blank the whole board.
fn decode_listings(docs: Vec<Document>) -> Vec<Listing> {
    docs.iter()
        .filter_map(|doc| match doc.decode::<Listing>() {
            Ok(listing) => Some(listing),
            Err(err) => {
                warn!(id = %doc.id, %err, "skipping undecodable listing");
                None
            }
        })
        .collect()
}
