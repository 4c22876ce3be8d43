//! Hold timing and expiry bookkeeping.
//!
//! A reservation holds one unit of a drop until `expires_at`. Expiry is
//! never pushed; it is discovered by the sweeper or by a purchase attempt
//! comparing the deadline against the injected clock.

use std::collections::BTreeMap;

use chrono::Duration;

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

/// Default hold window in seconds.
pub const DEFAULT_HOLD_SECS: i64 = 60;

/// Longest accepted hold window: one day.
pub const MAX_HOLD_SECS: i64 = 86_400;

/// Default sweeper period in seconds.
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 10;

/// Longest accepted sweeper period: one hour.
pub const MAX_SWEEP_INTERVAL_SECS: u64 = 3_600;

/// Deadline for a hold created at `now`.
///
/// Fails with `Internal` if the deadline is not representable.
pub fn expires_at(now: Timestamp, hold: Duration) -> Result<Timestamp, CoreError> {
    now.checked_add_signed(hold).ok_or_else(|| {
        CoreError::Internal(format!("Hold deadline overflows: {now} + {hold}"))
    })
}

/// A hold is expired once `now` is strictly past its deadline.
pub fn is_expired(expires_at: Timestamp, now: Timestamp) -> bool {
    now > expires_at
}

/// Reserve and purchase requests must name the acting user.
pub fn require_user_id(user_id: Option<DbId>) -> Result<DbId, CoreError> {
    user_id.ok_or(CoreError::UserIdRequired)
}

/// Count expired holds per drop.
///
/// Input pairs are `(reservation_id, drop_id)`. The result is keyed by drop
/// id in ascending order so that callers touching several drop rows always
/// do so in the same order.
pub fn units_per_drop(expired: &[(DbId, DbId)]) -> BTreeMap<DbId, i32> {
    let mut counts = BTreeMap::new();
    for &(_, drop_id) in expired {
        *counts.entry(drop_id).or_insert(0) += 1;
    }
    counts
}
