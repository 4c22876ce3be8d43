//! The reservation write path.
//!
//! `reserve` runs as one transaction holding the drop's row lock from the
//! initial read until commit, so concurrent reservations on the same drop
//! are serialized and can never both see the last unit. Reservations on
//! different drops do not contend.

use std::sync::Arc;

use dropstock_core::clock::Clock;
use dropstock_core::drop::check_reservable;
use dropstock_core::error::CoreError;
use dropstock_core::reservation::expires_at;
use dropstock_core::types::DbId;
use dropstock_db::models::reservation::Reservation;
use dropstock_db::repositories::{DropRepo, ReservationRepo};
use dropstock_db::DbPool;
use dropstock_events::EventNotifier;

use crate::error::{is_foreign_key_violation, InventoryError, InventoryResult};

/// Foreign key from `reservations.user_id` to `users.id`.
const RESERVATION_USER_FK: &str = "reservations_user_id_fkey";

/// Creates holds against the stock ledger.
#[derive(Clone)]
pub struct ReservationManager {
    pool: DbPool,
    notifier: Arc<dyn EventNotifier>,
    clock: Arc<dyn Clock>,
    hold_duration: chrono::Duration,
}

impl ReservationManager {
    pub fn new(
        pool: DbPool,
        notifier: Arc<dyn EventNotifier>,
        clock: Arc<dyn Clock>,
        hold_duration: chrono::Duration,
    ) -> Self {
        Self {
            pool,
            notifier,
            clock,
            hold_duration,
        }
    }

    /// Hold one unit of `drop_id` for `user_id`.
    ///
    /// Fails with `DropNotFound`, `DropNotStarted` or `OutOfStock` without
    /// side effects, and with `Internal` if the hold deadline overflows.
    /// Any failure after the lock is taken rolls back both the decrement
    /// and the insert. The new stock level is published only after commit.
    pub async fn reserve(&self, user_id: DbId, drop_id: DbId) -> InventoryResult<Reservation> {
        let mut tx = self.pool.begin().await?;

        let drop = DropRepo::lock_by_id(&mut tx, drop_id)
            .await?
            .ok_or_else(|| CoreError::drop_not_found(drop_id))?;

        let now = self.clock.now();
        check_reservable(drop.id, drop.start_time, drop.available_stock, now)?;
        let deadline = expires_at(now, self.hold_duration)?;

        // The row is locked, so this only comes back empty if the check
        // above and the ledger disagree.
        let drop = DropRepo::take_unit(&mut tx, drop_id)
            .await?
            .ok_or(CoreError::OutOfStock { drop_id })?;

        let reservation = ReservationRepo::create(&mut tx, user_id, drop_id, deadline)
            .await
            .map_err(|e| -> InventoryError {
                if is_foreign_key_violation(&e, RESERVATION_USER_FK) {
                    CoreError::NotFound {
                        entity: "User",
                        id: user_id,
                    }
                    .into()
                } else {
                    e.into()
                }
            })?;

        tx.commit().await?;

        tracing::info!(
            reservation_id = reservation.id,
            user_id,
            drop_id,
            available_stock = drop.available_stock,
            expires_at = %reservation.expires_at,
            "Reservation created"
        );

        self.notifier.notify_stock_changed(drop_id, drop.available_stock);

        Ok(reservation)
    }
}
