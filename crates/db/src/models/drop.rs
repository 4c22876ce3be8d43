//! Drop (stock ledger) models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use dropstock_core::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A row from the `drops` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Drop {
    pub id: DbId,
    pub name: String,
    pub price: f64,
    pub total_stock: i32,
    pub available_stock: i32,
    pub start_time: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Create DTO
// ---------------------------------------------------------------------------

/// Input for creating a new drop. `start_time` defaults to now.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDrop {
    pub name: String,
    pub price: f64,
    pub total_stock: i32,
    pub start_time: Option<Timestamp>,
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// One entry of a drop's activity feed.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RecentPurchase {
    #[serde(skip)]
    pub drop_id: DbId,
    pub username: String,
    #[sqlx(rename = "purchased_at")]
    pub timestamp: Timestamp,
}

/// A drop together with its most recent purchases.
#[derive(Debug, Clone, Serialize)]
pub struct DropWithActivity {
    #[serde(flatten)]
    pub drop: Drop,
    pub recent_purchases: Vec<RecentPurchase>,
}

/// Post-update stock level of a single drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, FromRow)]
pub struct StockLevel {
    pub drop_id: DbId,
    pub available_stock: i32,
}
