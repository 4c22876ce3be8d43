//! The reservation core.
//!
//! Four services share one PostgreSQL pool, one injected [`EventNotifier`]
//! and one injected [`Clock`]:
//!
//! - [`DropCatalog`]: create and list drops.
//! - [`ReservationManager`]: lock a drop row, take a unit, create a hold.
//! - [`ExpirationSweeper`]: periodically return stock from expired holds.
//! - [`PurchaseFinalizer`]: turn an active hold into a sale, or expire it
//!   lazily if its deadline has passed.
//!
//! The `drops.available_stock` column is the only authoritative counter.
//! Every change to it is committed in the same transaction as the
//! reservation change that justifies it.
//!
//! [`EventNotifier`]: dropstock_events::EventNotifier
//! [`Clock`]: dropstock_core::clock::Clock

pub mod catalog;
pub mod config;
pub mod error;
pub mod purchase;
pub mod reservation;
pub mod sweeper;

pub use catalog::{DropCatalog, LedgerSnapshot};
pub use config::InventoryConfig;
pub use error::{InventoryError, InventoryResult};
pub use purchase::{PurchaseFinalizer, PurchaseReceipt};
pub use reservation::ReservationManager;
pub use sweeper::{ExpirationSweeper, SweepReport, SweeperHandle};
