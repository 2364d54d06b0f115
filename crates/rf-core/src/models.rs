//! # Domain Models
//!
//! These structs mirror the document shapes held in the backing store.
//! Wire names are camelCase (the store predates this codebase), so every
//! record carries explicit serde renames where the Rust name differs.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// A raw document as the store hands it to us: an opaque id plus a bag of
/// fields. The id lives outside the fields, exactly like the store keys it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub fields: serde_json::Value,
}

impl Document {
    pub fn new(id: impl Into<String>, fields: serde_json::Value) -> Self {
        Self { id: id.into(), fields }
    }

    /// Decodes the field bag into a typed record, attaching the document id.
    ///
    /// The id is never part of the serialized fields, which is why the typed
    /// records mark it `#[serde(skip)]` and we patch it in here.
    pub fn decode<T>(&self) -> Result<T>
    where
        T: serde::de::DeserializeOwned + Identified,
    {
        let mut record: T = serde_json::from_value(self.fields.clone())
            .map_err(|e| AppError::Validation(format!("malformed {}: {e}", T::KIND)))?;
        record.set_id(&self.id);
        Ok(record)
    }
}

/// Encodes a typed record into a document field bag.
pub fn encode_fields<T: Serialize>(record: &T) -> Result<serde_json::Value> {
    serde_json::to_value(record).map_err(|e| AppError::Validation(format!("unencodable record: {e}")))
}

/// Implemented by records whose identity is the store-assigned document id.
pub trait Identified {
    const KIND: &'static str;
    fn set_id(&mut self, id: &str);
}

/// One rental unit, as listed in the `apartments` collection.
///
/// The owner is fixed at creation; there is no edit operation, so everything
/// besides `image_url` is immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    #[serde(skip)]
    pub id: String,
    pub name: String,
    pub city: String,
    pub street_name: String,
    pub street_number: i64,
    pub area_size: f64,
    #[serde(rename = "hasAC")]
    pub has_ac: bool,
    pub year_built: i32,
    pub price: f64,
    pub date_available: NaiveDate,
    /// Absent until an image upload has finished and produced a URL.
    pub image_url: Option<String>,
    /// Account id of the creator. Only this account may delete the listing.
    #[serde(rename = "userId")]
    pub owner_id: String,
}

impl Identified for Listing {
    const KIND: &'static str = "listing";
    fn set_id(&mut self, id: &str) {
        self.id = id.to_string();
    }
}

/// The validated payload for creating a listing: everything the user types,
/// minus what the system fills in (id, owner, image URL).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingDraft {
    pub name: String,
    pub city: String,
    pub street_name: String,
    pub street_number: i64,
    pub area_size: f64,
    #[serde(rename = "hasAC")]
    pub has_ac: bool,
    pub year_built: i32,
    pub price: f64,
    pub date_available: NaiveDate,
}

impl ListingDraft {
    /// Rejects blank text fields before any network activity happens.
    /// Numeric and date fields are already typed, so presence is structural.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("name", &self.name),
            ("city", &self.city),
            ("streetName", &self.street_name),
        ] {
            if value.trim().is_empty() {
                return Err(AppError::Validation(format!("{field} must not be empty")));
            }
        }
        Ok(())
    }

    /// Completes the draft into a full listing owned by `owner_id`.
    /// The id stays empty until the store assigns one.
    pub fn into_listing(self, owner_id: &str, image_url: Option<String>) -> Listing {
        Listing {
            id: String::new(),
            name: self.name,
            city: self.city,
            street_name: self.street_name,
            street_number: self.street_number,
            area_size: self.area_size,
            has_ac: self.has_ac,
            year_built: self.year_built,
            price: self.price,
            date_available: self.date_available,
            image_url,
            owner_id: owner_id.to_string(),
        }
    }
}

/// Per-account record in the `users` collection. Created with an empty
/// favorites list the first time an authenticated account is seen.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(skip)]
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_admin: bool,
    /// Listing ids this account has marked favorite. Unique, order-irrelevant.
    #[serde(default)]
    pub favorites: Vec<String>,
}

impl Identified for UserProfile {
    const KIND: &'static str = "user profile";
    fn set_id(&mut self, id: &str) {
        self.id = id.to_string();
    }
}

/// A message posted on a listing, in the `messages` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(skip)]
    pub id: String,
    pub apartment_id: String,
    pub user_id: String,
    pub user_name: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl Identified for Message {
    const KIND: &'static str = "message";
    fn set_id(&mut self, id: &str) {
        self.id = id.to_string();
    }
}
