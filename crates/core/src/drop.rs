//! Drop constants and validation rules.
//!
//! A drop is a limited-quantity release. `total_stock` is fixed at creation;
//! `available_stock` is the authoritative count of units neither held nor
//! sold and must stay within `0..=total_stock`.

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum allowed length for a drop name.
pub const MAX_DROP_NAME_LENGTH: usize = 200;

/// Upper bound on units per drop. Keeps `available_stock` well inside `INTEGER`.
pub const MAX_TOTAL_STOCK: i32 = 1_000_000;

/// How many recent purchases are attached to a drop listing by default.
pub const DEFAULT_RECENT_PURCHASES: i64 = 3;

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a drop name: non-empty after trimming and within
/// [`MAX_DROP_NAME_LENGTH`].
pub fn validate_drop_name(name: &str) -> Result<(), CoreError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CoreError::Validation(
            "Drop name must not be empty".to_string(),
        ));
    }
    let length = name.chars().count();
    if length > MAX_DROP_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "Drop name must not exceed {MAX_DROP_NAME_LENGTH} characters, got {length}"
        )));
    }
    Ok(())
}

/// Validate a unit price: finite and strictly positive.
pub fn validate_price(price: f64) -> Result<(), CoreError> {
    if !price.is_finite() || price <= 0.0 {
        return Err(CoreError::Validation(format!(
            "Price must be a positive number, got {price}"
        )));
    }
    Ok(())
}

/// Validate the initial stock of a drop.
pub fn validate_total_stock(total_stock: i32) -> Result<(), CoreError> {
    if total_stock <= 0 {
        return Err(CoreError::Validation(format!(
            "Total stock must be at least 1, got {total_stock}"
        )));
    }
    if total_stock > MAX_TOTAL_STOCK {
        return Err(CoreError::Validation(format!(
            "Total stock must not exceed {MAX_TOTAL_STOCK}, got {total_stock}"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Eligibility
// ---------------------------------------------------------------------------

/// Decide whether one more unit may be held from a drop whose row is
/// currently locked by the caller.
pub fn check_reservable(
    drop_id: DbId,
    start_time: Timestamp,
    available_stock: i32,
    now: Timestamp,
) -> Result<(), CoreError> {
    if start_time > now {
        return Err(CoreError::DropNotStarted { drop_id });
    }
    if available_stock <= 0 {
        return Err(CoreError::OutOfStock { drop_id });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::{Duration, Utc};

    // -- validate_drop_name ---------------------------------------------------

    #[test]
    fn accepts_normal_name() {
        assert!(validate_drop_name("Sneaker Drop #4").is_ok());
    }

    #[test]
    fn rejects_blank_name() {
        assert!(validate_drop_name("").is_err());
        assert!(validate_drop_name("   ").is_err());
    }

    #[test]
    fn rejects_overlong_name() {
        let name = "x".repeat(MAX_DROP_NAME_LENGTH + 1);
        assert!(validate_drop_name(&name).is_err());
    }

    #[test]
    fn length_counts_characters_of_the_trimmed_name() {
        let accented = "é".repeat(MAX_DROP_NAME_LENGTH);
        assert!(validate_drop_name(&accented).is_ok());

        let padded = format!("  {}  ", "x".repeat(MAX_DROP_NAME_LENGTH));
        assert!(validate_drop_name(&padded).is_ok());

        let over = "é".repeat(MAX_DROP_NAME_LENGTH + 1);
        assert_matches!(
            validate_drop_name(&over),
            Err(CoreError::Validation(msg)) if msg.ends_with("got 201")
        );
    }

    // -- validate_price / validate_total_stock --------------------------------

    #[test]
    fn price_must_be_positive_and_finite() {
        assert!(validate_price(19.99).is_ok());
        assert!(validate_price(0.0).is_err());
        assert!(validate_price(-1.0).is_err());
        assert!(validate_price(f64::NAN).is_err());
        assert!(validate_price(f64::INFINITY).is_err());
    }

    #[test]
    fn total_stock_bounds() {
        assert!(validate_total_stock(1).is_ok());
        assert!(validate_total_stock(MAX_TOTAL_STOCK).is_ok());
        assert!(validate_total_stock(0).is_err());
        assert!(validate_total_stock(MAX_TOTAL_STOCK + 1).is_err());
    }

    // -- eligibility ----------------------------------------------------------

    #[test]
    fn reservable_when_started_with_stock() {
        let now = Utc::now();
        assert!(check_reservable(1, now - Duration::seconds(1), 1, now).is_ok());
    }

    #[test]
    fn empty_drop_is_out_of_stock() {
        let now = Utc::now();
        assert_matches!(
            check_reservable(7, now, 0, now),
            Err(CoreError::OutOfStock { drop_id: 7 })
        );
    }

    #[test]
    fn future_drop_is_not_started() {
        let now = Utc::now();
        assert_matches!(
            check_reservable(7, now + Duration::hours(1), 10, now),
            Err(CoreError::DropNotStarted { drop_id: 7 })
        );
    }
}
