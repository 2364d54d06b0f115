//! rusty-flats/crates/rf-engine/src/lib.rs
//!
//! The listing view-model: filter criteria, pure view derivation, optimistic
//! mutations against the document store, and the listing-detail message
//! thread. Everything here talks to the backing services through the
//! explicitly constructed [`Services`] context; there are no ambient
//! singletons.

pub mod context;
pub mod detail;
pub mod filter;
pub mod viewmodel;

pub use context::Services;
pub use detail::ListingDetail;
pub use filter::{derive_view, FilterCriteria, FilterPatch, RangeFilter, SortKey};
pub use viewmodel::ListingViewModel;
