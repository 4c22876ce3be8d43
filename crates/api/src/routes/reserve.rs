use axum::routing::post;
use axum::Router;

use crate::handlers::reservations;
use crate::state::AppState;

/// Routes mounted at `/reserve`.
///
/// ```text
/// POST   /{drop_id}     -> reserve
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/{drop_id}", post(reservations::reserve))
}
