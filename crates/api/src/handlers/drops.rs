//! Handlers for the `/drops` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use dropstock_core::types::DbId;
use dropstock_db::models::drop::{CreateDrop, Drop, DropWithActivity};
use dropstock_inventory::LedgerSnapshot;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/drops
///
/// Drops that have started and still have stock, newest start first, each
/// with its most recent purchases.
pub async fn list_drops(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<DropWithActivity>>>> {
    let drops = state.catalog.list_active_drops_now().await?;
    Ok(Json(DataResponse { data: drops }))
}

/// POST /api/v1/drops
pub async fn create_drop(
    State(state): State<AppState>,
    Json(input): Json<CreateDrop>,
) -> AppResult<(StatusCode, Json<DataResponse<Drop>>)> {
    let drop = state.catalog.create_drop(&input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: drop })))
}

/// GET /api/v1/drops/{id}
pub async fn get_drop(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<DropWithActivity>>> {
    let drop = state.catalog.get_drop(id).await?;
    Ok(Json(DataResponse { data: drop }))
}

/// GET /api/v1/drops/{id}/ledger
///
/// Where the drop's units currently are: available, held, sold.
pub async fn get_ledger(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<LedgerSnapshot>>> {
    let ledger = state.catalog.ledger(id).await?;
    Ok(Json(DataResponse { data: ledger }))
}
