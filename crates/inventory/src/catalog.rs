//! Drop creation and read-side listings.
//!
//! None of this is concurrency-sensitive: creation is a single insert and
//! listings are plain reads of committed state.

use std::collections::HashMap;
use std::sync::Arc;

use dropstock_core::clock::Clock;
use dropstock_core::drop::{validate_drop_name, validate_price, validate_total_stock};
use dropstock_core::error::CoreError;
use dropstock_core::types::{DbId, Timestamp};
use dropstock_db::models::drop::{CreateDrop, Drop, DropWithActivity, RecentPurchase};
use dropstock_db::models::status::ReservationStatus;
use dropstock_db::repositories::{DropRepo, PurchaseRepo, ReservationRepo};
use dropstock_db::DbPool;
use serde::Serialize;

use crate::error::InventoryResult;

/// Point-in-time accounting of a drop's units.
///
/// In every committed state `available_stock + active + purchased`
/// equals `total_stock`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LedgerSnapshot {
    pub drop_id: DbId,
    pub total_stock: i32,
    pub available_stock: i32,
    pub active: i64,
    pub purchased: i64,
    pub expired: i64,
}

impl LedgerSnapshot {
    /// Whether the units add up.
    pub fn is_balanced(&self) -> bool {
        i64::from(self.available_stock) + self.active + self.purchased
            == i64::from(self.total_stock)
    }
}

/// Administrative and read access to drops.
#[derive(Clone)]
pub struct DropCatalog {
    pool: DbPool,
    clock: Arc<dyn Clock>,
    recent_purchases_limit: i64,
}

impl DropCatalog {
    pub fn new(pool: DbPool, clock: Arc<dyn Clock>, recent_purchases_limit: i64) -> Self {
        Self {
            pool,
            clock,
            recent_purchases_limit,
        }
    }

    /// Create a drop with `available_stock = total_stock`.
    ///
    /// A missing `start_time` means "now" on the injected clock, so the drop
    /// is immediately reservable.
    pub async fn create_drop(&self, input: &CreateDrop) -> InventoryResult<Drop> {
        validate_drop_name(&input.name)?;
        validate_price(input.price)?;
        validate_total_stock(input.total_stock)?;

        let input = CreateDrop {
            start_time: Some(input.start_time.unwrap_or_else(|| self.clock.now())),
            ..input.clone()
        };
        let drop = DropRepo::create(&self.pool, &input).await?;

        tracing::info!(
            drop_id = drop.id,
            name = %drop.name,
            total_stock = drop.total_stock,
            start_time = %drop.start_time,
            "Drop created"
        );

        Ok(drop)
    }

    /// Drops that have started by `now` and still have stock, each with
    /// its most recent purchases.
    pub async fn list_active_drops(&self, now: Timestamp) -> InventoryResult<Vec<DropWithActivity>> {
        let drops = DropRepo::list_active(&self.pool, now).await?;
        self.attach_activity(drops).await
    }

    /// [`list_active_drops`](Self::list_active_drops) at the injected clock's now.
    pub async fn list_active_drops_now(&self) -> InventoryResult<Vec<DropWithActivity>> {
        self.list_active_drops(self.clock.now()).await
    }

    /// A single drop with its most recent purchases.
    pub async fn get_drop(&self, drop_id: DbId) -> InventoryResult<DropWithActivity> {
        let drop = DropRepo::find_by_id(&self.pool, drop_id)
            .await?
            .ok_or_else(|| CoreError::drop_not_found(drop_id))?;

        let mut with_activity = self.attach_activity(vec![drop]).await?;
        with_activity
            .pop()
            .ok_or_else(|| CoreError::drop_not_found(drop_id).into())
    }

    /// Count a drop's units by where they currently are.
    pub async fn ledger(&self, drop_id: DbId) -> InventoryResult<LedgerSnapshot> {
        let drop = DropRepo::find_by_id(&self.pool, drop_id)
            .await?
            .ok_or_else(|| CoreError::drop_not_found(drop_id))?;

        let active =
            ReservationRepo::count_by_drop_and_status(&self.pool, drop_id, ReservationStatus::Active)
                .await?;
        let purchased = ReservationRepo::count_by_drop_and_status(
            &self.pool,
            drop_id,
            ReservationStatus::Purchased,
        )
        .await?;
        let expired = ReservationRepo::count_by_drop_and_status(
            &self.pool,
            drop_id,
            ReservationStatus::Expired,
        )
        .await?;

        Ok(LedgerSnapshot {
            drop_id,
            total_stock: drop.total_stock,
            available_stock: drop.available_stock,
            active,
            purchased,
            expired,
        })
    }

    async fn attach_activity(&self, drops: Vec<Drop>) -> InventoryResult<Vec<DropWithActivity>> {
        let ids: Vec<DbId> = drops.iter().map(|d| d.id).collect();
        let recent =
            PurchaseRepo::recent_for_drops(&self.pool, &ids, self.recent_purchases_limit).await?;

        let mut by_drop: HashMap<DbId, Vec<RecentPurchase>> = HashMap::new();
        for purchase in recent {
            by_drop.entry(purchase.drop_id).or_default().push(purchase);
        }

        Ok(drops
            .into_iter()
            .map(|drop| DropWithActivity {
                recent_purchases: by_drop.remove(&drop.id).unwrap_or_default(),
                drop,
            })
            .collect())
    }
}
