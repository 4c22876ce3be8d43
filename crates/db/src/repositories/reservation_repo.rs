//! Repository for the `reservations` table (holds).
//!
//! Every status transition is guarded by `status_id = ACTIVE` in the
//! `WHERE` clause, so a transition that lost a race affects zero rows and
//! the caller can tell.

use sqlx::{PgPool, Postgres, Transaction};
use dropstock_core::types::{DbId, Timestamp};

use crate::models::reservation::{ExpiredHold, Reservation};
use crate::models::status::ReservationStatus;

/// Column list for `reservations` queries.
const COLUMNS: &str = "\
    id, user_id, drop_id, status_id, expires_at, created_at, updated_at";

/// Provides hold creation, lookup and status transitions.
pub struct ReservationRepo;

impl ReservationRepo {
    /// Insert a new ACTIVE hold.
    pub async fn create(
        tx: &mut Transaction<'_, Postgres>,
        user_id: DbId,
        drop_id: DbId,
        expires_at: Timestamp,
    ) -> Result<Reservation, sqlx::Error> {
        let query = format!(
            "INSERT INTO reservations (user_id, drop_id, status_id, expires_at) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Reservation>(&query)
            .bind(user_id)
            .bind(drop_id)
            .bind(ReservationStatus::Active.id())
            .bind(expires_at)
            .fetch_one(&mut **tx)
            .await
    }

    /// Find a reservation by its ID, whatever its status.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Reservation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM reservations WHERE id = $1");
        sqlx::query_as::<_, Reservation>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Load an ACTIVE reservation owned by `user_id` and lock its row.
    ///
    /// If another transaction resolves the row first, PostgreSQL re-checks
    /// the filter once the lock is granted and this returns `None`.
    pub async fn lock_active_for_user(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<Reservation>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM reservations \
             WHERE id = $1 AND user_id = $2 AND status_id = $3 \
             FOR NO KEY UPDATE"
        );
        sqlx::query_as::<_, Reservation>(&query)
            .bind(id)
            .bind(user_id)
            .bind(ReservationStatus::Active.id())
            .fetch_optional(&mut **tx)
            .await
    }

    /// Lock every ACTIVE hold whose deadline is before `now`.
    ///
    /// Rows already locked by an in-flight purchase are skipped; they are
    /// either resolved by that purchase or picked up by a later sweep.
    pub async fn lock_expired(
        tx: &mut Transaction<'_, Postgres>,
        now: Timestamp,
    ) -> Result<Vec<ExpiredHold>, sqlx::Error> {
        sqlx::query_as::<_, ExpiredHold>(
            "SELECT id, drop_id FROM reservations \
             WHERE status_id = $1 AND expires_at < $2 \
             ORDER BY id \
             FOR NO KEY UPDATE SKIP LOCKED",
        )
        .bind(ReservationStatus::Active.id())
        .bind(now)
        .fetch_all(&mut **tx)
        .await
    }

    /// Move the given holds from ACTIVE to EXPIRED.
    ///
    /// Returns only the rows this call actually transitioned; a hold that
    /// was no longer ACTIVE is left untouched and omitted.
    pub async fn mark_expired(
        tx: &mut Transaction<'_, Postgres>,
        ids: &[DbId],
    ) -> Result<Vec<ExpiredHold>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_as::<_, ExpiredHold>(
            "UPDATE reservations \
             SET status_id = $2, updated_at = NOW() \
             WHERE id = ANY($1) AND status_id = $3 \
             RETURNING id, drop_id",
        )
        .bind(ids)
        .bind(ReservationStatus::Expired.id())
        .bind(ReservationStatus::Active.id())
        .fetch_all(&mut **tx)
        .await
    }

    /// Move a single hold from ACTIVE to PURCHASED.
    ///
    /// Returns `false` if the hold was no longer ACTIVE.
    pub async fn mark_purchased(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE reservations \
             SET status_id = $2, updated_at = NOW() \
             WHERE id = $1 AND status_id = $3",
        )
        .bind(id)
        .bind(ReservationStatus::Purchased.id())
        .bind(ReservationStatus::Active.id())
        .execute(&mut **tx)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count holds on a drop in the given status.
    pub async fn count_by_drop_and_status(
        pool: &PgPool,
        drop_id: DbId,
        status: ReservationStatus,
    ) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM reservations WHERE drop_id = $1 AND status_id = $2",
        )
        .bind(drop_id)
        .bind(status.id())
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    /// List a user's holds, newest first.
    pub async fn list_by_user(pool: &PgPool, user_id: DbId) -> Result<Vec<Reservation>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM reservations WHERE user_id = $1 ORDER BY id DESC"
        );
        sqlx::query_as::<_, Reservation>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }
}
