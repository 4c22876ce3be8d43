//! Domain types and rules shared by every dropstock crate.
//!
//! Nothing in here touches the database or the network; the storage and
//! transaction discipline lives in `dropstock-db` and `dropstock-inventory`.

pub mod clock;
pub mod drop;
pub mod error;
pub mod reservation;
pub mod types;
pub mod user;
