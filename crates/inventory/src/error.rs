use dropstock_core::error::CoreError;

/// Failure of an inventory operation.
///
/// `Core` errors are caller-facing outcomes (not found, out of stock,
/// expired) and carry no side effects beyond what the operation documents.
/// `Database` errors mean the transaction was rolled back; see
/// [`InventoryError::is_retryable`].
#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Convenience alias for inventory return values.
pub type InventoryResult<T> = Result<T, InventoryError>;

impl InventoryError {
    /// Whether resubmitting the same request may succeed.
    ///
    /// Lock conflicts, timeouts and lost connections are retryable; caller
    /// errors and constraint violations are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            InventoryError::Core(_) => false,
            InventoryError::Database(err) => is_transient(err),
        }
    }
}

/// Classify a sqlx error as transient.
///
/// Transient SQLSTATEs: `40001` serialization_failure, `40P01`
/// deadlock_detected, `55P03` lock_not_available, `57014` query_canceled
/// (statement or lock timeout).
pub fn is_transient(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => true,
        sqlx::Error::Database(db_err) => matches!(
            db_err.code().as_deref(),
            Some("40001" | "40P01" | "55P03" | "57014")
        ),
        _ => false,
    }
}

/// Whether `err` is a foreign key violation on `constraint`.
pub(crate) fn is_foreign_key_violation(err: &sqlx::Error, constraint: &str) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            db_err.code().as_deref() == Some("23503") && db_err.constraint() == Some(constraint)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_are_not_retryable() {
        let err = InventoryError::from(CoreError::OutOfStock { drop_id: 1 });
        assert!(!err.is_retryable());
    }

    #[test]
    fn pool_timeout_is_retryable() {
        assert!(InventoryError::from(sqlx::Error::PoolTimedOut).is_retryable());
    }

    #[test]
    fn io_error_is_retryable() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
        assert!(InventoryError::from(sqlx::Error::Io(io)).is_retryable());
    }

    #[test]
    fn row_not_found_is_not_retryable() {
        assert!(!InventoryError::from(sqlx::Error::RowNotFound).is_retryable());
    }

    #[test]
    fn core_message_is_passed_through() {
        let err = InventoryError::from(CoreError::ReservationExpired { reservation_id: 4 });
        assert_eq!(err.to_string(), "Reservation 4 has expired");
    }
}
