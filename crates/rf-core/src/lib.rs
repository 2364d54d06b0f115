//! rusty-flats/crates/rf-core/src/lib.rs
//!
//! The central domain models and port definitions for rusty-flats.

pub mod models;
pub mod traits;
pub mod error;

// Re-exporting for easier access in other crates
pub use models::*;
pub use traits::*;
pub use error::*;

/// Collection names as stored in the backing document store.
pub mod collections {
    pub const APARTMENTS: &str = "apartments";
    pub const USERS: &str = "users";
    pub const MESSAGES: &str = "messages";
}
