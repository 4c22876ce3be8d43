//! User entity model and DTOs.
//!
//! Accounts are owned by an external system; this table only provides
//! stable ids and display names.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use dropstock_core::types::{DbId, Timestamp};

/// Full user row from the `users` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: DbId,
    pub username: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new user.
#[derive(Debug, Deserialize)]
pub struct CreateUser {
    pub username: String,
}
