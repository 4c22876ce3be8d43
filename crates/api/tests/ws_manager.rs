//! Unit tests for `WsManager`.
//!
//! These exercise the connection manager directly, without performing any
//! HTTP upgrades.

use axum::extract::ws::Message;
use dropstock_api::ws::WsManager;

// ---------------------------------------------------------------------------
// Test: add() and remove() track the connection count
// ---------------------------------------------------------------------------

#[tokio::test]
async fn add_and_remove_track_connection_count() {
    let manager = WsManager::new();
    assert_eq!(manager.connection_count().await, 0);

    let _rx1 = manager.add("conn-1".to_string()).await;
    let _rx2 = manager.add("conn-2".to_string()).await;
    assert_eq!(manager.connection_count().await, 2);

    manager.remove("conn-1").await;
    manager.remove("nonexistent").await;
    assert_eq!(manager.connection_count().await, 1);
}

// ---------------------------------------------------------------------------
// Test: broadcast() reaches every live connection
// ---------------------------------------------------------------------------

#[tokio::test]
async fn broadcast_reaches_every_connection() {
    let manager = WsManager::new();
    let mut rx1 = manager.add("conn-1".to_string()).await;
    let mut rx2 = manager.add("conn-2".to_string()).await;

    let delivered = manager
        .broadcast(Message::Text(r#"{"type":"stock_update"}"#.into()))
        .await;
    assert_eq!(delivered, 2);

    for rx in [&mut rx1, &mut rx2] {
        match rx.recv().await.unwrap() {
            Message::Text(text) => assert!(text.as_str().contains("stock_update")),
            other => panic!("expected text frame, got {other:?}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Test: broadcast() skips connections whose receiver is gone
// ---------------------------------------------------------------------------

#[tokio::test]
async fn broadcast_skips_closed_connections() {
    let manager = WsManager::new();
    let _rx1 = manager.add("conn-1".to_string()).await;
    drop(manager.add("conn-2".to_string()).await);

    let delivered = manager.broadcast(Message::Text("hello".into())).await;
    assert_eq!(delivered, 1);
}

// ---------------------------------------------------------------------------
// Test: shutdown_all() sends Close and clears all connections
// ---------------------------------------------------------------------------

#[tokio::test]
async fn shutdown_all_sends_close_and_clears() {
    let manager = WsManager::new();
    let mut rx1 = manager.add("conn-1".to_string()).await;
    let mut rx2 = manager.add("conn-2".to_string()).await;

    manager.shutdown_all().await;

    assert_eq!(manager.connection_count().await, 0);
    assert!(matches!(rx1.recv().await, Some(Message::Close(None))));
    assert!(matches!(rx2.recv().await, Some(Message::Close(None))));
}

// ---------------------------------------------------------------------------
// Test: ping_all() sends a Ping frame
// ---------------------------------------------------------------------------

#[tokio::test]
async fn ping_all_sends_ping() {
    let manager = WsManager::new();
    let mut rx = manager.add("conn-1".to_string()).await;

    manager.ping_all().await;

    assert!(matches!(rx.recv().await, Some(Message::Ping(_))));
}
