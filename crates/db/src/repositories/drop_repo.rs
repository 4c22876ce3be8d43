//! Repository for the `drops` table (the stock ledger).
//!
//! `available_stock` is only ever changed with in-place arithmetic
//! (`available_stock = available_stock ± n`) so that concurrent writers
//! compose without lost updates. The transactional helpers take an open
//! [`Transaction`] and never commit it themselves.

use sqlx::{PgPool, Postgres, Transaction};
use dropstock_core::types::{DbId, Timestamp};

use crate::models::drop::{CreateDrop, Drop, StockLevel};

/// Column list for `drops` queries.
const COLUMNS: &str = "\
    id, name, price, total_stock, available_stock, start_time, \
    created_at, updated_at";

/// Provides ledger reads and the stock mutation primitives.
pub struct DropRepo;

impl DropRepo {
    /// Insert a new drop with all of its stock available.
    pub async fn create(pool: &PgPool, input: &CreateDrop) -> Result<Drop, sqlx::Error> {
        let query = format!(
            "INSERT INTO drops (name, price, total_stock, available_stock, start_time) \
             VALUES ($1, $2, $3, $3, COALESCE($4, NOW())) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Drop>(&query)
            .bind(input.name.trim())
            .bind(input.price)
            .bind(input.total_stock)
            .bind(input.start_time)
            .fetch_one(pool)
            .await
    }

    /// Find a drop by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Drop>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM drops WHERE id = $1");
        sqlx::query_as::<_, Drop>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Read a drop inside an open transaction without locking it.
    pub async fn find_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
    ) -> Result<Option<Drop>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM drops WHERE id = $1");
        sqlx::query_as::<_, Drop>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Load a drop and take an exclusive row lock held until the
    /// transaction ends. Concurrent callers on the same drop queue here.
    ///
    /// `NO KEY UPDATE` still excludes other writers but does not wait on
    /// the key-share locks taken by foreign key checks from purchase and
    /// reservation inserts.
    pub async fn lock_by_id(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
    ) -> Result<Option<Drop>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM drops WHERE id = $1 FOR NO KEY UPDATE");
        sqlx::query_as::<_, Drop>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Lock several drop rows, always in ascending ID order.
    ///
    /// Multi-drop writers call this first so two of them can never hold
    /// locks in opposite orders.
    pub async fn lock_many(
        tx: &mut Transaction<'_, Postgres>,
        ids: &[DbId],
    ) -> Result<(), sqlx::Error> {
        if ids.is_empty() {
            return Ok(());
        }
        sqlx::query("SELECT id FROM drops WHERE id = ANY($1) ORDER BY id FOR NO KEY UPDATE")
            .bind(ids)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    /// Take one unit out of `available_stock`.
    ///
    /// Returns `None` when the drop is missing or already empty, in which
    /// case nothing was written.
    pub async fn take_unit(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
    ) -> Result<Option<Drop>, sqlx::Error> {
        let query = format!(
            "UPDATE drops \
             SET available_stock = available_stock - 1, updated_at = NOW() \
             WHERE id = $1 AND available_stock > 0 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Drop>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Return units to several drops in one statement.
    ///
    /// `returns` pairs a drop ID with the number of units to add back. This
    /// is the single increment primitive shared by the expiration sweep and
    /// the lazy expiry on purchase. Returns the new stock level of every
    /// drop that was updated, ordered by drop ID.
    pub async fn return_units(
        tx: &mut Transaction<'_, Postgres>,
        returns: &[(DbId, i32)],
    ) -> Result<Vec<StockLevel>, sqlx::Error> {
        if returns.is_empty() {
            return Ok(Vec::new());
        }

        let (drop_ids, units): (Vec<DbId>, Vec<i32>) = returns.iter().copied().unzip();

        sqlx::query_as::<_, StockLevel>(
            "WITH returned AS ( \
                 SELECT drop_id, units FROM UNNEST($1::BIGINT[], $2::INTEGER[]) AS r(drop_id, units) \
             ) \
             UPDATE drops d \
             SET available_stock = d.available_stock + returned.units, updated_at = NOW() \
             FROM returned \
             WHERE d.id = returned.drop_id \
             RETURNING d.id AS drop_id, d.available_stock",
        )
        .bind(&drop_ids)
        .bind(&units)
        .fetch_all(&mut **tx)
        .await
        .map(|mut levels| {
            levels.sort_by_key(|l| l.drop_id);
            levels
        })
    }

    /// List drops that have started by `now` and still have stock,
    /// newest start first.
    pub async fn list_active(pool: &PgPool, now: Timestamp) -> Result<Vec<Drop>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM drops \
             WHERE start_time <= $1 AND available_stock > 0 \
             ORDER BY start_time DESC, id DESC"
        );
        sqlx::query_as::<_, Drop>(&query)
            .bind(now)
            .fetch_all(pool)
            .await
    }
}
