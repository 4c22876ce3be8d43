#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use dropstock_core::clock::ManualClock;
use dropstock_core::types::DbId;
use dropstock_db::models::drop::{CreateDrop, Drop};
use dropstock_db::repositories::UserRepo;
use dropstock_events::{EventBus, EventNotifier, InventoryEvent, PlatformEvent};
use dropstock_inventory::{
    DropCatalog, ExpirationSweeper, InventoryConfig, PurchaseFinalizer, ReservationManager,
};
use sqlx::PgPool;
use tokio::sync::broadcast;

/// Every inventory service wired to one pool, one bus and one manual clock.
pub struct Harness {
    pub pool: PgPool,
    pub bus: Arc<EventBus>,
    pub clock: Arc<ManualClock>,
    pub catalog: DropCatalog,
    pub reservations: ReservationManager,
    pub purchases: PurchaseFinalizer,
    pub sweeper: ExpirationSweeper,
}

impl Harness {
    pub fn new(pool: PgPool) -> Self {
        let bus = Arc::new(EventBus::default());
        let clock = Arc::new(ManualClock::starting_now());
        let notifier: Arc<dyn EventNotifier> = bus.clone();
        let config = InventoryConfig::default();

        Self {
            catalog: DropCatalog::new(pool.clone(), clock.clone(), config.recent_purchases_limit),
            reservations: ReservationManager::new(
                pool.clone(),
                Arc::clone(&notifier),
                clock.clone(),
                config.hold_duration,
            ),
            purchases: PurchaseFinalizer::new(pool.clone(), Arc::clone(&notifier), clock.clone()),
            sweeper: ExpirationSweeper::new(
                pool.clone(),
                notifier,
                clock.clone(),
                Duration::from_millis(20),
            ),
            pool,
            bus,
            clock,
        }
    }

    pub async fn user(&self, username: &str) -> DbId {
        UserRepo::find_or_create(&self.pool, username)
            .await
            .unwrap()
            .id
    }

    pub async fn drop_with_stock(&self, total_stock: i32) -> Drop {
        self.catalog
            .create_drop(&CreateDrop {
                name: format!("Drop of {total_stock}"),
                price: 99.5,
                total_stock,
                start_time: None,
            })
            .await
            .unwrap()
    }

    pub async fn available(&self, drop_id: DbId) -> i32 {
        self.catalog.ledger(drop_id).await.unwrap().available_stock
    }

    /// Move the clock past a default 60 second hold.
    pub fn pass_hold_deadline(&self) {
        self.clock.advance(chrono::Duration::seconds(70));
    }
}

/// Everything currently buffered on the receiver, decoded.
pub fn drain(rx: &mut broadcast::Receiver<PlatformEvent>) -> Vec<InventoryEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if let Some(decoded) = InventoryEvent::from_platform_event(&event) {
            events.push(decoded);
        }
    }
    events
}
