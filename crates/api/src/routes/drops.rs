//! Route definitions for the `/drops` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::drops;
use crate::state::AppState;

/// Routes mounted at `/drops`.
///
/// ```text
/// GET    /              -> list_drops
/// POST   /              -> create_drop
/// GET    /{id}          -> get_drop
/// GET    /{id}/ledger   -> get_ledger
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(drops::list_drops).post(drops::create_drop))
        .route("/{id}", get(drops::get_drop))
        .route("/{id}/ledger", get(drops::get_ledger))
}
