//! Repository for the `users` table.

use sqlx::PgPool;
use dropstock_core::types::DbId;

use crate::models::user::{CreateUser, User};

/// Column list for `users` queries.
const COLUMNS: &str = "id, username, created_at, updated_at";

/// Provides the minimal user directory operations.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user. Duplicate usernames fail on `uq_users_username`.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (username) VALUES ($1) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(input.username.trim())
            .fetch_one(pool)
            .await
    }

    /// Return the user with `username`, creating it if absent.
    pub async fn find_or_create(pool: &PgPool, username: &str) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (username) VALUES ($1) \
             ON CONFLICT (username) DO UPDATE SET username = EXCLUDED.username \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(username)
            .fetch_one(pool)
            .await
    }

    /// Find a user by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all users ordered by ID.
    pub async fn list(pool: &PgPool) -> Result<Vec<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users ORDER BY id");
        sqlx::query_as::<_, User>(&query).fetch_all(pool).await
    }
}
