//! Repository for the `purchases` table.

use sqlx::{PgPool, Postgres, Transaction};
use dropstock_core::types::DbId;

use crate::models::drop::RecentPurchase;
use crate::models::purchase::Purchase;

/// Column list for `purchases` queries.
const COLUMNS: &str = "id, user_id, drop_id, reservation_id, created_at";

/// Provides sale record creation and activity-feed reads.
pub struct PurchaseRepo;

impl PurchaseRepo {
    /// Record a sale for a finalized reservation.
    ///
    /// `reservation_id` is unique, so a second insert for the same hold
    /// fails with constraint `uq_purchases_reservation_id`.
    pub async fn create(
        tx: &mut Transaction<'_, Postgres>,
        user_id: DbId,
        drop_id: DbId,
        reservation_id: DbId,
    ) -> Result<Purchase, sqlx::Error> {
        let query = format!(
            "INSERT INTO purchases (user_id, drop_id, reservation_id) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Purchase>(&query)
            .bind(user_id)
            .bind(drop_id)
            .bind(reservation_id)
            .fetch_one(&mut **tx)
            .await
    }

    /// The `limit` most recent purchases for each of `drop_ids`, newest
    /// first within each drop.
    pub async fn recent_for_drops(
        pool: &PgPool,
        drop_ids: &[DbId],
        limit: i64,
    ) -> Result<Vec<RecentPurchase>, sqlx::Error> {
        if drop_ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_as::<_, RecentPurchase>(
            "SELECT drop_id, username, purchased_at FROM ( \
                 SELECT p.drop_id, u.username, p.created_at AS purchased_at, \
                        ROW_NUMBER() OVER ( \
                            PARTITION BY p.drop_id ORDER BY p.created_at DESC, p.id DESC \
                        ) AS rn \
                 FROM purchases p \
                 JOIN users u ON u.id = p.user_id \
                 WHERE p.drop_id = ANY($1) \
             ) ranked \
             WHERE rn <= $2 \
             ORDER BY drop_id, purchased_at DESC",
        )
        .bind(drop_ids)
        .bind(limit)
        .fetch_all(pool)
        .await
    }
}
