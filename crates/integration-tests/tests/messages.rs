//! Listing detail and its message thread.


use fixtures::{account, harness, listing_fields};
use rf_core::error::AppError;
use rf_core::traits::DocumentStore;
use rf_engine::ListingDetail;

#[tokio::test]
async fn load_fetches_the_listing_and_its_messages_in_fetch_order() {
    let h = harness();
    h.store.seed("apartments", "b1", listing_fields("Berlin", 500.0, 40.0, "acct-1"));
    h.store.seed(
        "messages",
        "m1",
        serde_json::json!({
            "apartmentId": "b1",
            "userId": "acct-2",
            "userName": "Bea",
            "message": "Is it still available?",
            "timestamp": "2026-08-01T10:00:00Z",
        }),
    );
    h.store.seed(
        "messages",
        "other",
        serde_json::json!({
            "apartmentId": "zzz",
            "userId": "acct-3",
            "userName": "Cy",
            "message": "wrong thread",
            "timestamp": "2026-08-01T11:00:00Z",
        }),
    );

    let detail = ListingDetail::load(h.services, "b1").await.unwrap();
    assert_eq!(detail.listing.city, "Berlin");
    assert_eq!(detail.messages.len(), 1);
    assert_eq!(detail.messages[0].user_name, "Bea");
}

#[tokio::test]
async fn loading_a_missing_listing_is_not_found() {
    let h = harness();
    let err = ListingDetail::load(h.services, "ghost").await.err().unwrap();
    assert!(matches!(err, AppError::NotFound(_, _)));
}

#[tokio::test]
async fn send_message_requires_a_signed_in_account() {
    let h = harness();
    h.store.seed("apartments", "b1", listing_fields("Berlin", 500.0, 40.0, "acct-1"));

    let mut detail = ListingDetail::load(h.services, "b1").await.unwrap();
    let err = detail.send_message("hello").await.unwrap_err();
    assert!(matches!(err, AppError::Unauthenticated(_)));
    assert!(detail.messages.is_empty());
}

#[tokio::test]
async fn blank_messages_are_rejected_before_any_store_call() {
    let h = harness();
    h.store.seed("apartments", "b1", listing_fields("Berlin", 500.0, 40.0, "acct-1"));
    h.auth.sign_in(account("acct-2"));

    let mut detail = ListingDetail::load(h.services, "b1").await.unwrap();
    let err = detail.send_message("   ").await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert!(h.store.fetch_all("messages").await.unwrap().is_empty());
}

#[tokio::test]
async fn send_message_persists_and_refreshes_the_thread() {
    let h = harness();
    h.store.seed("apartments", "b1", listing_fields("Berlin", 500.0, 40.0, "acct-1"));
    h.auth.sign_in(account("acct-2"));

    let mut detail = ListingDetail::load(h.services, "b1").await.unwrap();
    detail.send_message("  Is it still available?  ").await.unwrap();

    assert_eq!(detail.messages.len(), 1);
    let msg = &detail.messages[0];
    assert_eq!(msg.apartment_id, "b1");
    assert_eq!(msg.user_id, "acct-2");
    assert_eq!(msg.user_name, "user acct-2"); // display name, not email
    assert_eq!(msg.message, "Is it still available?");
}
