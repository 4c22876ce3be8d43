//! Handler for finalizing a reservation.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use dropstock_core::reservation::require_user_id;
use dropstock_core::types::DbId;
use dropstock_inventory::PurchaseReceipt;

use crate::error::AppResult;
use crate::handlers::ActingUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/purchase/{reservation_id}
///
/// Returns 201 with the purchase and the drop on success, and 410 with
/// `RESERVATION_EXPIRED` if the hold ran out (its unit has already been
/// returned to stock by then).
pub async fn purchase(
    State(state): State<AppState>,
    Path(reservation_id): Path<DbId>,
    Json(body): Json<ActingUser>,
) -> AppResult<(StatusCode, Json<DataResponse<PurchaseReceipt>>)> {
    let user_id = require_user_id(body.user_id)?;
    let receipt = state.purchases.purchase(user_id, reservation_id).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: receipt })))
}
