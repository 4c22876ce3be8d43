//! Route definitions for the `/users` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::{reservations, users};
use crate::state::AppState;

/// Routes mounted at `/users`.
///
/// ```text
/// GET    /                     -> list_users
/// POST   /                     -> create_user
/// GET    /{id}/reservations    -> list_user_reservations
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(users::list_users).post(users::create_user))
        .route("/{id}/reservations", get(reservations::list_user_reservations))
}
