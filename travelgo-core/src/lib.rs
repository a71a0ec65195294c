pub mod allocation;
pub mod booking;
pub mod repository;
pub mod service;

pub use allocation::{Allocation, BookingRequest, FareClass};
pub use booking::{BookingDetails, DetailsRecord, LedgerEntry, NewLedgerEntry};
pub use repository::{
    BookingLedger, InventoryStore, InventoryUnit, RemoveOutcome, ReserveOutcome, ServiceCatalog,
    UnitState,
};
pub use service::{ServiceKind, ServiceRef, ServiceSnapshot};

use serde::Serialize;

/// Every failure the booking core can surface to its caller
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BookingError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Storage failure: {0}")]
    StorageFailure(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    NotFound,
    InvalidRequest,
    Conflict,
    Forbidden,
    StorageFailure,
}

impl BookingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BookingError::NotFound(_) => ErrorKind::NotFound,
            BookingError::InvalidRequest(_) => ErrorKind::InvalidRequest,
            BookingError::Conflict(_) => ErrorKind::Conflict,
            BookingError::Forbidden(_) => ErrorKind::Forbidden,
            BookingError::StorageFailure(_) => ErrorKind::StorageFailure,
        }
    }

    /// Only storage failures may be retried unchanged; the rest need a corrected request
    pub fn is_retryable(&self) -> bool {
        matches!(self, BookingError::StorageFailure(_))
    }

    pub fn storage(err: impl std::fmt::Display) -> Self {
        BookingError::StorageFailure(err.to_string())
    }
}

pub type BookingResult<T> = Result<T, BookingError>;
