//! The purchase path: finalize an active hold, or expire it lazily.
//!
//! The reservation row is locked for the whole check-and-transition span.
//! The drop row is not locked up front; the lazy-expiry return goes
//! through [`DropRepo::return_units`], the same in-place increment the
//! sweeper uses, so the two writers compose regardless of interleaving.

use std::sync::Arc;

use dropstock_core::clock::Clock;
use dropstock_core::error::CoreError;
use dropstock_core::reservation::{is_expired, units_per_drop};
use dropstock_core::types::DbId;
use dropstock_db::models::drop::Drop;
use dropstock_db::models::purchase::Purchase;
use dropstock_db::models::reservation::Reservation;
use dropstock_db::repositories::{DropRepo, PurchaseRepo, ReservationRepo, UserRepo};
use dropstock_db::DbPool;
use dropstock_events::EventNotifier;
use serde::Serialize;
use sqlx::{Postgres, Transaction};

use crate::error::InventoryResult;

/// A completed sale together with the drop it consumed a unit of.
#[derive(Debug, Clone, Serialize)]
pub struct PurchaseReceipt {
    pub purchase: Purchase,
    pub drop: Drop,
}

/// Converts holds into sales.
#[derive(Clone)]
pub struct PurchaseFinalizer {
    pool: DbPool,
    notifier: Arc<dyn EventNotifier>,
    clock: Arc<dyn Clock>,
}

impl PurchaseFinalizer {
    pub fn new(pool: DbPool, notifier: Arc<dyn EventNotifier>, clock: Arc<dyn Clock>) -> Self {
        Self {
            pool,
            notifier,
            clock,
        }
    }

    /// Finalize `reservation_id` on behalf of `user_id`.
    ///
    /// - `ReservationNotFound` if no ACTIVE hold with that id belongs to the
    ///   user (wrong id, wrong user, or already resolved).
    /// - `DropNotFound` if the hold points at a missing drop.
    /// - `ReservationExpired` if the deadline has passed. Before returning
    ///   this error the hold is marked EXPIRED and its unit is returned,
    ///   and that change is committed.
    ///
    /// On success a Purchase row is created and the hold becomes PURCHASED;
    /// `available_stock` is not touched.
    pub async fn purchase(
        &self,
        user_id: DbId,
        reservation_id: DbId,
    ) -> InventoryResult<PurchaseReceipt> {
        let mut tx = self.pool.begin().await?;

        let reservation = ReservationRepo::lock_active_for_user(&mut tx, reservation_id, user_id)
            .await?
            .ok_or_else(|| CoreError::reservation_not_found(reservation_id))?;

        let drop = DropRepo::find_in_tx(&mut tx, reservation.drop_id)
            .await?
            .ok_or_else(|| CoreError::drop_not_found(reservation.drop_id))?;

        if is_expired(reservation.expires_at, self.clock.now()) {
            self.expire_lazily(tx, &reservation).await?;
            return Err(CoreError::ReservationExpired { reservation_id }.into());
        }

        let purchase = PurchaseRepo::create(&mut tx, user_id, drop.id, reservation.id).await?;

        // The row lock makes losing this transition impossible; treat it as
        // a vanished reservation if it ever happens.
        if !ReservationRepo::mark_purchased(&mut tx, reservation.id).await? {
            return Err(CoreError::reservation_not_found(reservation_id).into());
        }

        tx.commit().await?;

        tracing::info!(
            purchase_id = purchase.id,
            reservation_id,
            user_id,
            drop_id = drop.id,
            drop_name = %drop.name,
            "Purchase completed"
        );

        let drop = self.current_drop(drop).await;
        let username = self.display_name(user_id).await;
        self.notifier.notify_stock_changed(drop.id, drop.available_stock);
        self.notifier.notify_purchase(drop.id, user_id, &username, purchase.created_at);

        Ok(PurchaseReceipt { purchase, drop })
    }

    /// The drop as committed now. The copy read inside the purchase
    /// transaction was not locked, so reserves on the same drop may have
    /// moved its stock since.
    async fn current_drop(&self, read_in_tx: Drop) -> Drop {
        match DropRepo::find_by_id(&self.pool, read_in_tx.id).await {
            Ok(Some(current)) => current,
            Ok(None) => read_in_tx,
            Err(e) => {
                tracing::warn!(error = %e, drop_id = read_in_tx.id, "Post-purchase stock read failed");
                read_in_tx
            }
        }
    }

    /// Mark a stale hold EXPIRED and give its unit back, then commit.
    ///
    /// The unit is only returned if this call performed the transition.
    async fn expire_lazily(
        &self,
        mut tx: Transaction<'_, Postgres>,
        reservation: &Reservation,
    ) -> InventoryResult<()> {
        let expired = ReservationRepo::mark_expired(&mut tx, &[reservation.id]).await?;
        let pairs: Vec<(DbId, DbId)> = expired.iter().map(|h| (h.id, h.drop_id)).collect();
        let returns: Vec<(DbId, i32)> = units_per_drop(&pairs).into_iter().collect();

        let levels = DropRepo::return_units(&mut tx, &returns).await?;
        tx.commit().await?;

        tracing::info!(
            reservation_id = reservation.id,
            user_id = reservation.user_id,
            drop_id = reservation.drop_id,
            returned = expired.len(),
            "Reservation expired at purchase time"
        );

        for level in levels {
            self.notifier.notify_stock_changed(level.drop_id, level.available_stock);
        }
        Ok(())
    }

    /// Best-effort username lookup for the purchase event.
    async fn display_name(&self, user_id: DbId) -> String {
        match UserRepo::find_by_id(&self.pool, user_id).await {
            Ok(Some(user)) => user.username,
            Ok(None) => format!("User {user_id}"),
            Err(e) => {
                tracing::warn!(error = %e, user_id, "Username lookup failed");
                format!("User {user_id}")
            }
        }
    }
}
