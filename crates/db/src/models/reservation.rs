//! Reservation (hold) models.

use serde::Serialize;
use sqlx::FromRow;
use dropstock_core::types::{DbId, Timestamp};

use crate::models::status::{ReservationStatus, StatusId};

/// A row from the `reservations` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Reservation {
    pub id: DbId,
    pub user_id: DbId,
    pub drop_id: DbId,
    pub status_id: StatusId,
    pub expires_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Reservation {
    /// Decode `status_id`; `None` only if the lookup table was altered.
    pub fn status(&self) -> Option<ReservationStatus> {
        ReservationStatus::from_id(self.status_id)
    }
}

/// A reservation selected for expiry, reduced to what the sweep needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRow)]
pub struct ExpiredHold {
    pub id: DbId,
    pub drop_id: DbId,
}

/// API representation with the status spelled out.
#[derive(Debug, Clone, Serialize)]
pub struct ReservationResponse {
    pub id: DbId,
    pub user_id: DbId,
    pub drop_id: DbId,
    pub status: &'static str,
    pub expires_at: Timestamp,
    pub created_at: Timestamp,
}

impl From<Reservation> for ReservationResponse {
    fn from(r: Reservation) -> Self {
        Self {
            status: r.status().map_or("UNKNOWN", ReservationStatus::name),
            id: r.id,
            user_id: r.user_id,
            drop_id: r.drop_id,
            expires_at: r.expires_at,
            created_at: r.created_at,
        }
    }
}
