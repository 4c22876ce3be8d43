use std::sync::Arc;

use dropstock_core::clock::Clock;
use dropstock_events::{EventBus, EventNotifier};
use dropstock_inventory::{DropCatalog, InventoryConfig, PurchaseFinalizer, ReservationManager};

use crate::config::ServerConfig;
use crate::ws::WsManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: dropstock_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// WebSocket connection manager (browser clients).
    pub ws_manager: Arc<WsManager>,
    /// Event bus the inventory services publish to.
    pub event_bus: Arc<EventBus>,
    /// Drop creation and listings.
    pub catalog: DropCatalog,
    /// Hold creation.
    pub reservations: ReservationManager,
    /// Hold finalization.
    pub purchases: PurchaseFinalizer,
}

impl AppState {
    /// Wire the inventory services to one pool, bus and clock.
    pub fn new(
        pool: dropstock_db::DbPool,
        config: Arc<ServerConfig>,
        inventory: &InventoryConfig,
        clock: Arc<dyn Clock>,
        ws_manager: Arc<WsManager>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        let notifier: Arc<dyn EventNotifier> = event_bus.clone();

        Self {
            catalog: DropCatalog::new(
                pool.clone(),
                Arc::clone(&clock),
                inventory.recent_purchases_limit,
            ),
            reservations: ReservationManager::new(
                pool.clone(),
                Arc::clone(&notifier),
                Arc::clone(&clock),
                inventory.hold_duration,
            ),
            purchases: PurchaseFinalizer::new(pool.clone(), notifier, clock),
            pool,
            config,
            ws_manager,
            event_bus,
        }
    }
}
