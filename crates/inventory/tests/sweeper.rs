//! Expiration sweep behaviour: bulk return, idempotence, the race with
//! lazy expiry on purchase, and cancellation of the periodic task.

mod common;

use std::time::Duration as StdDuration;

use assert_matches::assert_matches;
use chrono::Duration;
use common::{drain, Harness};
use dropstock_core::error::CoreError;
use dropstock_db::models::drop::StockLevel;
use dropstock_events::InventoryEvent;
use dropstock_inventory::InventoryError;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Test: nothing to do before any deadline passes
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn live_holds_are_left_alone(pool: PgPool) {
    let h = Harness::new(pool);
    let user = h.user("alice").await;
    let drop = h.drop_with_stock(2).await;
    h.reservations.reserve(user, drop.id).await.unwrap();

    h.clock.advance(Duration::seconds(59));
    let report = h.sweeper.sweep_once().await.unwrap();

    assert_eq!(report.expired, 0);
    assert!(report.stock_levels.is_empty());
    assert_eq!(h.available(drop.id).await, 1);
}

// ---------------------------------------------------------------------------
// Test: one sweep returns every expired unit across drops, once
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn sweep_returns_units_per_drop_exactly_once(pool: PgPool) {
    let h = Harness::new(pool);
    let first = h.drop_with_stock(5).await;
    let second = h.drop_with_stock(5).await;

    for i in 0..3 {
        let user = h.user(&format!("first-{i}")).await;
        h.reservations.reserve(user, first.id).await.unwrap();
    }
    let user = h.user("second-0").await;
    h.reservations.reserve(user, second.id).await.unwrap();
    assert_eq!(h.available(first.id).await, 2);
    assert_eq!(h.available(second.id).await, 4);

    h.pass_hold_deadline();
    let mut rx = h.bus.subscribe();

    let report = h.sweeper.sweep_once().await.unwrap();
    assert_eq!(report.expired, 4);
    assert_eq!(
        report.stock_levels,
        vec![
            StockLevel {
                drop_id: first.id,
                available_stock: 5
            },
            StockLevel {
                drop_id: second.id,
                available_stock: 5
            },
        ]
    );
    assert_eq!(
        drain(&mut rx),
        vec![
            InventoryEvent::StockUpdate {
                drop_id: first.id,
                available_stock: 5
            },
            InventoryEvent::StockUpdate {
                drop_id: second.id,
                available_stock: 5
            },
        ]
    );

    let again = h.sweeper.sweep_once().await.unwrap();
    assert_eq!(again.expired, 0);
    assert_eq!(h.available(first.id).await, 5);
    assert_eq!(h.available(second.id).await, 5);
    assert!(drain(&mut rx).is_empty());

    let ledger = h.catalog.ledger(first.id).await.unwrap();
    assert_eq!(ledger.expired, 3);
    assert!(ledger.is_balanced());
}

// ---------------------------------------------------------------------------
// Test: purchased holds are never swept
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn purchased_holds_are_not_returned(pool: PgPool) {
    let h = Harness::new(pool);
    let user = h.user("buyer").await;
    let drop = h.drop_with_stock(1).await;
    let reservation = h.reservations.reserve(user, drop.id).await.unwrap();
    h.purchases.purchase(user, reservation.id).await.unwrap();

    h.pass_hold_deadline();
    let report = h.sweeper.sweep_once().await.unwrap();

    assert_eq!(report.expired, 0);
    assert_eq!(h.available(drop.id).await, 0);
}

// ---------------------------------------------------------------------------
// Test: sweep racing a late purchase returns the unit exactly once
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn sweep_and_late_purchase_return_the_unit_once(pool: PgPool) {
    let h = Harness::new(pool);
    let user = h.user("racer").await;
    let drop = h.drop_with_stock(3).await;
    let reservation = h.reservations.reserve(user, drop.id).await.unwrap();
    h.pass_hold_deadline();

    let (sweep, purchase) = tokio::join!(
        h.sweeper.sweep_once(),
        h.purchases.purchase(user, reservation.id),
    );

    let sweep = sweep.unwrap();
    assert!(sweep.expired <= 1);
    assert_matches!(
        purchase,
        Err(InventoryError::Core(
            CoreError::ReservationExpired { .. } | CoreError::NotFound { entity: "Reservation", .. }
        ))
    );

    // Whoever lost the race, a follow-up sweep has nothing left to do.
    assert_eq!(h.sweeper.sweep_once().await.unwrap().expired, 0);

    let ledger = h.catalog.ledger(drop.id).await.unwrap();
    assert_eq!(ledger.available_stock, 3);
    assert_eq!(ledger.expired, 1);
    assert_eq!(ledger.purchased, 0);
    assert!(ledger.is_balanced());
}

// ---------------------------------------------------------------------------
// Test: the spawned sweeper releases holds and stops on request
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn spawned_sweeper_releases_holds_and_stops(pool: PgPool) {
    let h = Harness::new(pool);
    let user = h.user("background").await;
    let drop = h.drop_with_stock(1).await;
    h.reservations.reserve(user, drop.id).await.unwrap();
    h.pass_hold_deadline();

    let handle = h.sweeper.clone().spawn();

    let released = tokio::time::timeout(StdDuration::from_secs(5), async {
        while h.available(drop.id).await != 1 {
            tokio::time::sleep(StdDuration::from_millis(10)).await;
        }
    })
    .await;
    assert!(released.is_ok(), "sweeper never returned the expired unit");

    assert!(handle.shutdown(StdDuration::from_secs(5)).await);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn stop_returns_immediately_and_ends_the_task(pool: PgPool) {
    let h = Harness::new(pool);

    let handle = h.sweeper.clone().spawn();
    handle.stop();

    let finished = tokio::time::timeout(StdDuration::from_secs(5), async {
        while !handle.is_finished() {
            tokio::time::sleep(StdDuration::from_millis(10)).await;
        }
    })
    .await;
    assert!(finished.is_ok(), "sweeper task kept running after stop");
}
