//! Dropstock event bus and notification sink.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`PlatformEvent`]: the event envelope carried on the bus.
//! - [`EventNotifier`]: the fire-and-forget sink the inventory core calls
//!   after every committed stock or purchase change.
//! - [`InventoryEvent`]: the typed payload of those notifications.

pub mod bus;
pub mod notifier;

pub use bus::{EventBus, PlatformEvent};
pub use notifier::{EventNotifier, InventoryEvent};
