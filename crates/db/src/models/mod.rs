//! Domain model structs and DTOs.
//!
//! Each submodule contains a `FromRow` + `Serialize` entity struct matching
//! the database row, plus the `Deserialize` DTOs used to create it.

pub mod drop;
pub mod purchase;
pub mod reservation;
pub mod status;
pub mod user;
