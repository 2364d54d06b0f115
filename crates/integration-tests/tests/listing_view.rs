//! View-model behavior around loading and filtering listings.


use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use fixtures::{harness, listing_fields};
use rf_core::models::Document;
use rf_core::traits::DocumentStore;
use rf_engine::{FilterCriteria, FilterPatch, ListingViewModel, RangeFilter, SortKey};

#[tokio::test]
async fn load_listings_populates_the_view_sorted_by_city() {
    let h = harness();
    h.store.seed("apartments", "p", listing_fields("Paris", 300.0, 30.0, "o1"));
    h.store.seed("apartments", "b1", listing_fields("Berlin", 500.0, 40.0, "o1"));
    h.store.seed("apartments", "b2", listing_fields("berlin", 700.0, 60.0, "o2"));

    let vm = ListingViewModel::new(h.services);
    let loaded = vm.load_listings().await.unwrap();
    assert_eq!(loaded.len(), 3);

    let view = vm.view();
    let ids: Vec<&str> = view.iter().map(|l| l.id.as_str()).collect();
    // Case-insensitive city sort; the two Berlins keep fetch order.
    assert_eq!(ids, ["b1", "b2", "p"]);
}

#[tokio::test]
async fn set_filter_narrows_and_reset_restores_everything_at_once() {
    let h = harness();
    h.store.seed("apartments", "p", listing_fields("Paris", 300.0, 30.0, "o1"));
    h.store.seed("apartments", "b1", listing_fields("Berlin", 500.0, 40.0, "o1"));
    h.store.seed("apartments", "b2", listing_fields("berlin", 700.0, 60.0, "o2"));

    let vm = ListingViewModel::new(h.services);
    vm.load_listings().await.unwrap();

    vm.set_filter(FilterPatch {
        city: Some("berl".into()),
        sort: Some(SortKey::Price),
        ..Default::default()
    });
    let ids: Vec<String> = vm.view().iter().map(|l| l.id.clone()).collect();
    assert_eq!(ids, ["b1", "b2"]);

    vm.set_filter(FilterPatch {
        price: Some(RangeFilter::new(Some(400.0), Some(600.0))),
        ..Default::default()
    });
    let ids: Vec<String> = vm.view().iter().map(|l| l.id.clone()).collect();
    assert_eq!(ids, ["b1"]);

    vm.reset_filters();
    assert_eq!(vm.criteria(), FilterCriteria::default());
    let ids: Vec<String> = vm.view().iter().map(|l| l.id.clone()).collect();
    assert_eq!(ids, ["b1", "b2", "p"]);
}

#[tokio::test]
async fn reset_sort_keeps_the_other_filters() {
    let h = harness();
    h.store.seed("apartments", "b1", listing_fields("Berlin", 500.0, 40.0, "o1"));
    h.store.seed("apartments", "p", listing_fields("Paris", 300.0, 30.0, "o1"));

    let vm = ListingViewModel::new(h.services);
    vm.load_listings().await.unwrap();
    vm.set_filter(FilterPatch {
        city: Some("berlin".into()),
        sort: Some(SortKey::Area),
        ..Default::default()
    });

    vm.reset_sort();
    let criteria = vm.criteria();
    assert_eq!(criteria.sort, SortKey::City);
    assert_eq!(criteria.city, "berlin");
    assert_eq!(vm.view().len(), 1);
}

#[tokio::test]
async fn subscribers_see_every_republished_view() {
    let h = harness();
    h.store.seed("apartments", "b1", listing_fields("Berlin", 500.0, 40.0, "o1"));

    let vm = ListingViewModel::new(h.services);
    let mut rx = vm.subscribe();

    vm.load_listings().await.unwrap();
    assert!(rx.has_changed().unwrap());
    assert_eq!(rx.borrow_and_update().len(), 1);

    vm.set_filter(FilterPatch {
        city: Some("nowhere".into()),
        ..Default::default()
    });
    assert!(rx.has_changed().unwrap());
    assert!(rx.borrow_and_update().is_empty());
}

#[tokio::test]
async fn undecodable_documents_are_skipped_not_fatal() {
    let h = harness();
    h.store.seed("apartments", "good", listing_fields("Berlin", 500.0, 40.0, "o1"));
    h.store.seed("apartments", "bad", serde_json::json!({ "city": 42 }));

    let vm = ListingViewModel::new(h.services);
    let loaded = vm.load_listings().await.unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(vm.view()[0].id, "good");
}

/// Store whose first fetch is slow and stale; completion order inverts
/// issue order.
struct RacingStore {
    calls: AtomicUsize,
}

#[async_trait]
impl DocumentStore for RacingStore {
    async fn fetch_all(&self, _collection: &str) -> anyhow::Result<Vec<Document>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call == 0 {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok(vec![Document::new("stale", listing_fields("Oldtown", 1.0, 1.0, "o"))])
        } else {
            Ok(vec![Document::new("fresh", listing_fields("Newtown", 2.0, 2.0, "o"))])
        }
    }

    async fn fetch_by_id(&self, _: &str, _: &str) -> anyhow::Result<Option<Document>> {
        anyhow::bail!("not used")
    }

    async fn fetch_where(
        &self,
        _: &str,
        _: &str,
        _: &serde_json::Value,
    ) -> anyhow::Result<Vec<Document>> {
        anyhow::bail!("not used")
    }

    async fn create(&self, _: &str, _: serde_json::Value) -> anyhow::Result<String> {
        anyhow::bail!("not used")
    }

    async fn update(&self, _: &str, _: &str, _: serde_json::Value) -> anyhow::Result<()> {
        anyhow::bail!("not used")
    }

    async fn delete(&self, _: &str, _: &str) -> anyhow::Result<()> {
        anyhow::bail!("not used")
    }
}

#[tokio::test]
async fn a_stale_slow_fetch_never_overwrites_a_fresher_one() {
    use std::sync::Arc;

    use fixtures::NullMediaStore;
    use rf_auth_session::SessionAuthProvider;
    use rf_engine::Services;

    let services = Services::new(
        Arc::new(RacingStore { calls: AtomicUsize::new(0) }),
        Arc::new(NullMediaStore),
        Arc::new(SessionAuthProvider::new()),
    );
    let vm = ListingViewModel::new(services);

    // Issued first, completes last; issued second, completes first.
    let (first, second) = tokio::join!(vm.load_listings(), vm.load_listings());
    assert_eq!(first.unwrap()[0].id, "stale");
    assert_eq!(second.unwrap()[0].id, "fresh");

    // The view keeps the data of the latest *issued* request.
    assert_eq!(vm.view()[0].id, "fresh");
}
