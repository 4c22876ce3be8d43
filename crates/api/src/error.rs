use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use dropstock_core::error::CoreError;
use dropstock_inventory::error::is_transient;
use dropstock_inventory::InventoryError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and raw sqlx failures.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `dropstock_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<InventoryError> for AppError {
    fn from(err: InventoryError) -> Self {
        match err {
            InventoryError::Core(core) => AppError::Core(core),
            InventoryError::Database(db) => AppError::Database(db),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => classify_core_error(core),

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),
        };

        let body = if status == StatusCode::SERVICE_UNAVAILABLE {
            json!({
                "error": message,
                "code": code,
                "retryable": true,
            })
        } else {
            json!({
                "error": message,
                "code": code,
            })
        };

        (status, axum::Json(body)).into_response()
    }
}

/// Map a domain error to an HTTP status, its categorical code and message.
fn classify_core_error(core: &CoreError) -> (StatusCode, &'static str, String) {
    let status = match core {
        CoreError::NotFound { .. } => StatusCode::NOT_FOUND,
        CoreError::Validation(_) | CoreError::UserIdRequired => StatusCode::BAD_REQUEST,
        CoreError::OutOfStock { .. } | CoreError::DropNotStarted { .. } => StatusCode::CONFLICT,
        CoreError::ReservationExpired { .. } => StatusCode::GONE,
        CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "Internal core error");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            );
        }
    };

    let message = match core {
        CoreError::NotFound { entity, id } => format!("{entity} with id {id} not found"),
        CoreError::Validation(msg) => msg.clone(),
        other => other.to_string(),
    };

    (status, core.code(), message)
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - Transient failures (lock conflicts, timeouts, lost connections) map
///   to 503 so the client can resubmit.
/// - `RowNotFound` maps to 404.
/// - Unique constraint violations (constraint name starting with `uq_`) map to 409.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    if is_transient(err) {
        tracing::warn!(error = %err, "Transient database failure");
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            "RETRYABLE",
            "The request could not be completed, please retry".to_string(),
        );
    }

    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err) => {
            // PostgreSQL unique constraint violation: error code 23505
            if db_err.code().as_deref() == Some("23505") {
                let constraint = db_err.constraint().unwrap_or("unknown");
                if constraint.starts_with("uq_") {
                    return (
                        StatusCode::CONFLICT,
                        "CONFLICT",
                        format!("Duplicate value violates unique constraint: {constraint}"),
                    );
                }
            }
            tracing::error!(error = %db_err, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
        other => {
            tracing::error!(error = %other, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}
