//! # Filtering and sorting
//!
//! Transient, client-local criteria plus the pure derivation that turns
//! (raw listings, favorites, criteria) into the view actually shown.
//! Derivation is recomputed in full on every input change; nothing is
//! patched incrementally, so the view can never drift from its inputs.

use std::cmp::Ordering;
use std::collections::HashSet;

use rf_core::models::Listing;

/// An optionally bounded numeric range. An absent side means "no constraint
/// on that side"; min > max is legal and simply matches nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RangeFilter {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl RangeFilter {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }

    /// Parses user-typed bounds once, at the input boundary. A blank or
    /// unparseable string is an absent bound, never an error.
    pub fn parse(min: &str, max: &str) -> Self {
        Self {
            min: parse_bound(min),
            max: parse_bound(max),
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min.is_none_or(|m| value >= m) && self.max.is_none_or(|m| value <= m)
    }
}

fn parse_bound(input: &str) -> Option<f64> {
    input.trim().parse().ok()
}

/// The key the derived view is ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    #[default]
    City,
    Price,
    Area,
}

/// Client-local filter state. Never persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    /// Case-insensitive substring match on the city; empty = inactive.
    pub city: String,
    pub price: RangeFilter,
    pub area: RangeFilter,
    pub favorites_only: bool,
    pub sort: SortKey,
}

impl FilterCriteria {
    /// Merges the fields present in `patch`, leaving the rest untouched.
    pub fn apply(&mut self, patch: FilterPatch) {
        if let Some(city) = patch.city {
            self.city = city;
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(area) = patch.area {
            self.area = area;
        }
        if let Some(favorites_only) = patch.favorites_only {
            self.favorites_only = favorites_only;
        }
        if let Some(sort) = patch.sort {
            self.sort = sort;
        }
    }
}

/// A partial update to [`FilterCriteria`]; `None` fields are left alone.
#[derive(Debug, Clone, Default)]
pub struct FilterPatch {
    pub city: Option<String>,
    pub price: Option<RangeFilter>,
    pub area: Option<RangeFilter>,
    pub favorites_only: Option<bool>,
    pub sort: Option<SortKey>,
}

/// Pure derivation of the displayed view.
///
/// Filter order matches the predicates' cost: substring, two range checks,
/// then set membership. The sort is stable, so listings with equal keys keep
/// their raw fetch order.
pub fn derive_view(
    listings: &[Listing],
    favorites: &HashSet<String>,
    criteria: &FilterCriteria,
) -> Vec<Listing> {
    let needle = criteria.city.trim().to_lowercase();

    let mut view: Vec<Listing> = listings
        .iter()
        .filter(|l| needle.is_empty() || l.city.to_lowercase().contains(&needle))
        .filter(|l| criteria.price.contains(l.price))
        .filter(|l| criteria.area.contains(l.area_size))
        .filter(|l| !criteria.favorites_only || favorites.contains(&l.id))
        .cloned()
        .collect();

    match criteria.sort {
        SortKey::City => view.sort_by(|a, b| compare_cities(&a.city, &b.city)),
        SortKey::Price => view.sort_by(|a, b| compare_f64(a.price, b.price)),
        SortKey::Area => view.sort_by(|a, b| compare_f64(a.area_size, b.area_size)),
    }

    view
}

fn compare_cities(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

// Listing prices and areas come from typed documents; NaN never reaches here.
fn compare_f64(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}
