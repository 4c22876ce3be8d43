use crate::types::DbId;

/// Domain-level failures shared by the inventory core and the API layer.
///
/// Every variant maps to a stable categorical code via [`CoreError::code`],
/// which the HTTP layer returns alongside the human-readable message.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("{entity} not found with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("userId is required")]
    UserIdRequired,

    #[error("Drop {drop_id} is out of stock")]
    OutOfStock { drop_id: DbId },

    #[error("Drop {drop_id} has not started yet")]
    DropNotStarted { drop_id: DbId },

    #[error("Reservation {reservation_id} has expired")]
    ReservationExpired { reservation_id: DbId },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for a missing drop.
    pub fn drop_not_found(id: DbId) -> Self {
        CoreError::NotFound { entity: "Drop", id }
    }

    /// Shorthand for a missing (or no longer active) reservation.
    pub fn reservation_not_found(id: DbId) -> Self {
        CoreError::NotFound {
            entity: "Reservation",
            id,
        }
    }

    /// Categorical error code returned to API clients.
    pub fn code(&self) -> &'static str {
        match self {
            CoreError::NotFound { entity: "Drop", .. } => "DROP_NOT_FOUND",
            CoreError::NotFound {
                entity: "Reservation",
                ..
            } => "RESERVATION_NOT_FOUND",
            CoreError::NotFound { .. } => "NOT_FOUND",
            CoreError::Validation(_) => "VALIDATION_ERROR",
            CoreError::UserIdRequired => "USER_ID_REQUIRED",
            CoreError::OutOfStock { .. } => "OUT_OF_STOCK",
            CoreError::DropNotStarted { .. } => "DROP_NOT_STARTED",
            CoreError::ReservationExpired { .. } => "RESERVATION_EXPIRED",
            CoreError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}
