pub mod drops;
pub mod health;
pub mod purchase;
pub mod reserve;
pub mod users;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /ws                                  WebSocket (stock_update, new_purchase)
///
/// /drops                               list active, create
/// /drops/{id}                          get with recent purchases
/// /drops/{id}/ledger                   unit accounting
///
/// /reserve/{drop_id}                   reserve one unit (POST)
/// /purchase/{reservation_id}           finalize a reservation (POST)
///
/// /users                               list, create
/// /users/{id}/reservations             a user's holds
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/ws", get(ws::ws_handler))
        .nest("/drops", drops::router())
        .nest("/reserve", reserve::router())
        .nest("/purchase", purchase::router())
        .nest("/users", users::router())
}
