//! Purchase (sale record) model. Rows are immutable once inserted.

use serde::Serialize;
use sqlx::FromRow;
use dropstock_core::types::{DbId, Timestamp};

/// A row from the `purchases` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Purchase {
    pub id: DbId,
    pub user_id: DbId,
    pub drop_id: DbId,
    pub reservation_id: DbId,
    pub created_at: Timestamp,
}
