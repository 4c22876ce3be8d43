pub mod drops;
pub mod purchases;
pub mod reservations;
pub mod users;

use dropstock_core::types::DbId;
use serde::Deserialize;

/// Request body naming the acting user, for reserve and purchase.
///
/// `user_id` is optional at the serde level so a missing value produces
/// `USER_ID_REQUIRED` rather than a generic body rejection.
#[derive(Debug, Default, Deserialize)]
pub struct ActingUser {
    #[serde(default, alias = "userId")]
    pub user_id: Option<DbId>,
}
