//! Handlers for the minimal `/users` directory.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use dropstock_core::user::validate_username;
use dropstock_db::models::user::{CreateUser, User};
use dropstock_db::repositories::UserRepo;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/users
pub async fn list_users(State(state): State<AppState>) -> AppResult<Json<DataResponse<Vec<User>>>> {
    let users = UserRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: users }))
}

/// POST /api/v1/users
///
/// Duplicate usernames are rejected with 409.
pub async fn create_user(
    State(state): State<AppState>,
    Json(input): Json<CreateUser>,
) -> AppResult<(StatusCode, Json<DataResponse<User>>)> {
    validate_username(&input.username)?;
    let user = UserRepo::create(&state.pool, &input).await?;
    tracing::info!(user_id = user.id, username = %user.username, "User created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: user })))
}
