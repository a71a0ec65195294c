pub mod app_config;
pub mod catalog_repo;
pub mod database;
pub mod inventory_repo;
pub mod ledger_repo;
pub mod redis_repo;

pub use catalog_repo::PgServiceCatalog;
pub use database::DbClient;
pub use inventory_repo::{mirror_layout, PgSeatInventory};
pub use ledger_repo::PgBookingLedger;
pub use redis_repo::RedisSeatInventory;

use travelgo_core::BookingError;

/// Map a backend error to the retryable storage failure kind
pub(crate) fn storage_failure(err: impl std::fmt::Display) -> BookingError {
    tracing::error!("Storage error: {}", err);
    BookingError::storage(err)
}
