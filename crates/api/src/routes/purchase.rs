use axum::routing::post;
use axum::Router;

use crate::handlers::purchases;
use crate::state::AppState;

/// Routes mounted at `/purchase`.
///
/// ```text
/// POST   /{reservation_id}  -> purchase
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/{reservation_id}", post(purchases::purchase))
}
