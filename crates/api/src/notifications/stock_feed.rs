//! Fan-out of inventory events to WebSocket clients.

use std::sync::Arc;

use axum::extract::ws::Message;
use dropstock_events::{InventoryEvent, PlatformEvent};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::ws::WsManager;

/// Forwards `stock_update` and `new_purchase` frames to every socket.
///
/// Delivery is best-effort. A slow feed that lags behind the bus skips the
/// missed events; clients recover on the next update or by refetching.
pub struct StockFeed {
    ws_manager: Arc<WsManager>,
}

impl StockFeed {
    pub fn new(ws_manager: Arc<WsManager>) -> Self {
        Self { ws_manager }
    }

    /// Run until `cancel` fires or the bus is closed.
    pub async fn run(
        self,
        mut receiver: broadcast::Receiver<PlatformEvent>,
        cancel: CancellationToken,
    ) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Stock feed stopping");
                    break;
                }
                received = receiver.recv() => match received {
                    Ok(event) => self.forward(&event).await,
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(skipped = n, "Stock feed lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        tracing::info!("Event bus closed, stock feed shutting down");
                        break;
                    }
                },
            }
        }
    }

    async fn forward(&self, event: &PlatformEvent) {
        let Some(inventory_event) = InventoryEvent::from_platform_event(event) else {
            return;
        };

        let text = match serde_json::to_string(&inventory_event) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, event_type = %event.event_type, "Failed to encode frame");
                return;
            }
        };

        let delivered = self.ws_manager.broadcast(Message::Text(text.into())).await;
        tracing::trace!(event_type = %event.event_type, delivered, "Inventory event pushed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dropstock_events::{EventBus, EventNotifier};

    fn frame_json(msg: Message) -> serde_json::Value {
        match msg {
            Message::Text(text) => serde_json::from_str(text.as_str()).unwrap(),
            other => panic!("expected a text frame, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn stock_changes_reach_connected_sockets() {
        let bus = EventBus::default();
        let ws_manager = Arc::new(WsManager::new());
        let mut rx = ws_manager.add("conn-1".to_string()).await;

        let cancel = CancellationToken::new();
        let feed = StockFeed::new(Arc::clone(&ws_manager));
        let feed = tokio::spawn(feed.run(bus.subscribe(), cancel.clone()));

        bus.notify_stock_changed(7, 41);

        let json = frame_json(rx.recv().await.unwrap());
        assert_eq!(json["type"], "stock_update");
        assert_eq!(json["drop_id"], 7);
        assert_eq!(json["available_stock"], 41);

        cancel.cancel();
        feed.await.unwrap();
    }

    #[tokio::test]
    async fn foreign_events_are_not_forwarded() {
        let bus = EventBus::default();
        let ws_manager = Arc::new(WsManager::new());
        let mut rx = ws_manager.add("conn-1".to_string()).await;

        let cancel = CancellationToken::new();
        let feed = StockFeed::new(Arc::clone(&ws_manager));
        let feed = tokio::spawn(feed.run(bus.subscribe(), cancel.clone()));

        bus.publish(PlatformEvent::new("something.else"));
        bus.notify_purchase(3, 1, "demo_user", chrono::Utc::now());

        let json = frame_json(rx.recv().await.unwrap());
        assert_eq!(json["type"], "new_purchase");
        assert_eq!(json["username"], "demo_user");

        cancel.cancel();
        feed.await.unwrap();
    }

    #[tokio::test]
    async fn closed_bus_ends_the_feed() {
        let bus = EventBus::default();
        let receiver = bus.subscribe();
        drop(bus);

        let feed = StockFeed::new(Arc::new(WsManager::new()));
        feed.run(receiver, CancellationToken::new()).await;
    }
}
