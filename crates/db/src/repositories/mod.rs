//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods. Reads
//! accept `&PgPool`; anything that must share a transaction with other
//! writes accepts `&mut Transaction<'_, Postgres>` and leaves commit or
//! rollback to the caller.

pub mod drop_repo;
pub mod purchase_repo;
pub mod reservation_repo;
pub mod user_repo;

pub use drop_repo::DropRepo;
pub use purchase_repo::PurchaseRepo;
pub use reservation_repo::ReservationRepo;
pub use user_repo::UserRepo;
