//! Handlers for creating and listing reservations.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use dropstock_core::error::CoreError;
use dropstock_core::reservation::require_user_id;
use dropstock_core::types::DbId;
use dropstock_db::models::reservation::ReservationResponse;
use dropstock_db::repositories::{ReservationRepo, UserRepo};

use crate::error::AppResult;
use crate::handlers::ActingUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/reserve/{drop_id}
///
/// Hold one unit for the user named in the body. The response carries
/// `expires_at`, the deadline for completing the purchase.
pub async fn reserve(
    State(state): State<AppState>,
    Path(drop_id): Path<DbId>,
    Json(body): Json<ActingUser>,
) -> AppResult<(StatusCode, Json<DataResponse<ReservationResponse>>)> {
    let user_id = require_user_id(body.user_id)?;
    let reservation = state.reservations.reserve(user_id, drop_id).await?;
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: reservation.into(),
        }),
    ))
}

/// GET /api/v1/users/{id}/reservations
///
/// Every hold the user has made, newest first, in any status.
pub async fn list_user_reservations(
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<ReservationResponse>>>> {
    UserRepo::find_by_id(&state.pool, user_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "User",
            id: user_id,
        })?;

    let reservations = ReservationRepo::list_by_user(&state.pool, user_id).await?;
    Ok(Json(DataResponse {
        data: reservations.into_iter().map(Into::into).collect(),
    }))
}
