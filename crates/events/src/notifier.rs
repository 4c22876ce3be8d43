//! The notification sink used by the inventory core.
//!
//! Notifications are best-effort: the core calls the notifier only after
//! its transaction has committed, ignores any outcome, and never waits on
//! a listener.

use dropstock_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};

use crate::bus::{EventBus, PlatformEvent};

/// Event name for a change in a drop's available stock.
pub const EVENT_STOCK_CHANGED: &str = "drop.stock_changed";

/// Event name for a completed purchase.
pub const EVENT_PURCHASED: &str = "drop.purchased";

/// Typed payload of the events the inventory core emits.
///
/// Serialized with a `type` tag so it can be forwarded to browsers as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InventoryEvent {
    StockUpdate {
        drop_id: DbId,
        available_stock: i32,
    },
    NewPurchase {
        drop_id: DbId,
        user_id: DbId,
        username: String,
        timestamp: Timestamp,
    },
}

impl InventoryEvent {
    /// The bus event name for this payload.
    pub fn event_type(&self) -> &'static str {
        match self {
            InventoryEvent::StockUpdate { .. } => EVENT_STOCK_CHANGED,
            InventoryEvent::NewPurchase { .. } => EVENT_PURCHASED,
        }
    }

    /// Decode the payload of a bus event, if it is one of ours.
    pub fn from_platform_event(event: &PlatformEvent) -> Option<Self> {
        match event.event_type.as_str() {
            EVENT_STOCK_CHANGED | EVENT_PURCHASED => {
                serde_json::from_value(event.payload.clone()).ok()
            }
            _ => None,
        }
    }
}

/// One-way sink for inventory state changes.
///
/// Implementations must not block and must not fail the caller.
pub trait EventNotifier: Send + Sync {
    fn notify_stock_changed(&self, drop_id: DbId, available_stock: i32);

    fn notify_purchase(&self, drop_id: DbId, user_id: DbId, username: &str, timestamp: Timestamp);
}

impl EventBus {
    fn publish_inventory(&self, event: InventoryEvent, drop_id: DbId, actor: Option<DbId>) {
        let payload = match serde_json::to_value(&event) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(error = %e, drop_id, "Failed to encode inventory event");
                return;
            }
        };

        let mut envelope = PlatformEvent::new(event.event_type())
            .with_source("drop", drop_id)
            .with_payload(payload);
        if let Some(user_id) = actor {
            envelope = envelope.with_actor(user_id);
        }
        self.publish(envelope);
    }
}

impl EventNotifier for EventBus {
    fn notify_stock_changed(&self, drop_id: DbId, available_stock: i32) {
        self.publish_inventory(
            InventoryEvent::StockUpdate {
                drop_id,
                available_stock,
            },
            drop_id,
            None,
        );
    }

    fn notify_purchase(&self, drop_id: DbId, user_id: DbId, username: &str, timestamp: Timestamp) {
        self.publish_inventory(
            InventoryEvent::NewPurchase {
                drop_id,
                user_id,
                username: username.to_string(),
                timestamp,
            },
            drop_id,
            Some(user_id),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn stock_change_is_published_as_tagged_payload() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        bus.notify_stock_changed(5, 12);

        let event = rx.recv().await.unwrap();
        assert_eq!(event.event_type, EVENT_STOCK_CHANGED);
        assert_eq!(event.source_entity_id, Some(5));
        assert_eq!(event.payload["type"], "stock_update");
        assert_eq!(event.payload["available_stock"], 12);
        assert_eq!(
            InventoryEvent::from_platform_event(&event),
            Some(InventoryEvent::StockUpdate {
                drop_id: 5,
                available_stock: 12
            })
        );
    }

    #[tokio::test]
    async fn purchase_carries_actor_and_username() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();
        let at = Utc::now();

        bus.notify_purchase(5, 1, "demo_user", at);

        let event = rx.recv().await.unwrap();
        assert_eq!(event.event_type, EVENT_PURCHASED);
        assert_eq!(event.actor_user_id, Some(1));
        assert_eq!(event.payload["type"], "new_purchase");
        assert_eq!(event.payload["username"], "demo_user");
        assert_eq!(
            InventoryEvent::from_platform_event(&event),
            Some(InventoryEvent::NewPurchase {
                drop_id: 5,
                user_id: 1,
                username: "demo_user".into(),
                timestamp: at,
            })
        );
    }

    #[test]
    fn foreign_events_are_not_decoded() {
        let event = PlatformEvent::new("something.else")
            .with_payload(serde_json::json!({"type": "stock_update"}));
        assert!(InventoryEvent::from_platform_event(&event).is_none());
    }

    #[test]
    fn notifying_without_listeners_is_harmless() {
        let bus = EventBus::default();
        bus.notify_stock_changed(1, 0);
        bus.notify_purchase(1, 2, "nobody", Utc::now());
    }
}
