//! Integration tests for loading snapshots written by other clients.
//!
//! The mobile client stores prices as JSON numbers; this store writes them as
//! decimal strings. Both must load.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use go_marketplace_cart::LoadOutcome;
use go_marketplace_core::{Price, ProductId};
use go_marketplace_integration_tests::TestContext;

#[tokio::test]
async fn test_loads_client_snapshot_with_numeric_prices() {
    let ctx = TestContext::new();
    ctx.write_raw(
        r#"[{"id":"a","title":"T","image_url":"u","price":10,"quantity":3},
            {"id":"b","title":"Mug","image_url":"m","price":7.49,"quantity":1}]"#,
    )
    .await;

    let store = ctx.open_store().await;
    let snapshot = store.snapshot();

    assert_eq!(store.load_outcome(), LoadOutcome::Restored { entries: 2 });
    let a = snapshot.get(&ProductId::new("a")).unwrap();
    assert_eq!(a.price, Price::from(10));
    assert_eq!(a.quantity.get(), 3);
    let b = snapshot.get(&ProductId::new("b")).unwrap();
    assert_eq!(b.price, Price::from_cents(749));
}

#[tokio::test]
async fn test_rewrites_client_snapshot_after_mutation() {
    let ctx = TestContext::new();
    ctx.write_raw(r#"[{"id":"a","title":"T","image_url":"u","price":10,"quantity":1}]"#)
        .await;

    let store = ctx.open_store().await;
    store.increment(&ProductId::new("a")).unwrap();
    store.flush().await.unwrap();

    let raw = ctx.read_raw().await.unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value[0]["id"], "a");
    assert_eq!(value[0]["quantity"], 2);
    assert_eq!(value[0]["price"], "10");
}

#[tokio::test]
async fn test_garbage_snapshot_starts_empty_and_is_replaced() {
    let ctx = TestContext::new();
    ctx.write_raw("this is not json").await;

    let store = ctx.open_store().await;
    assert_eq!(store.load_outcome(), LoadOutcome::Discarded);
    assert!(store.snapshot().is_empty());

    store
        .add_to_cart(go_marketplace_integration_tests::item("a", 500))
        .unwrap();
    store.flush().await.unwrap();
    drop(store);

    let restarted = ctx.open_store().await;
    assert_eq!(restarted.load_outcome(), LoadOutcome::Restored { entries: 1 });
}

#[tokio::test]
async fn test_duplicate_ids_are_merged_on_load() {
    let ctx = TestContext::new();
    ctx.write_raw(
        r#"[{"id":"a","title":"First","image_url":"u","price":1,"quantity":1},
            {"id":"a","title":"Second","image_url":"u","price":1,"quantity":2}]"#,
    )
    .await;

    let store = ctx.open_store().await;
    let snapshot = store.snapshot();

    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot.entries()[0].title, "First");
    assert_eq!(snapshot.entries()[0].quantity.get(), 3);
}
