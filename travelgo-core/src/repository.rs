use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use travelgo_shared::{BookingId, OwnerId};

use crate::booking::{LedgerEntry, NewLedgerEntry};
use crate::service::{ServiceRef, ServiceSnapshot};
use crate::BookingResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "owner", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnitState {
    Free,
    Booked(OwnerId),
}

impl UnitState {
    pub fn is_free(&self) -> bool {
        matches!(self, UnitState::Free)
    }
}

/// One seat of a bus or flight
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryUnit {
    pub unit_key: String,
    pub state: UnitState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReserveOutcome {
    Reserved,
    AlreadyBooked,
    /// No such seat on this service
    UnknownUnit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed(LedgerEntry),
    NotFoundOrForbidden,
}

/// Per-seat availability for bus and flight services
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Atomic Free -> Booked(owner). Exactly one concurrent caller wins a free unit.
    async fn reserve_unit(
        &self,
        service: ServiceRef,
        unit_key: &str,
        owner: &OwnerId,
    ) -> BookingResult<ReserveOutcome>;

    /// Sets a unit back to Free. Releasing a free or unknown unit is a no-op.
    async fn release_unit(&self, service: ServiceRef, unit_key: &str) -> BookingResult<()>;

    async fn list_units(&self, service: ServiceRef) -> BookingResult<Vec<InventoryUnit>>;

    /// Provisions free units. Units that already exist keep their state.
    async fn seed_units(&self, service: ServiceRef, unit_keys: &[String]) -> BookingResult<()>;
}

/// Append-only record of committed bookings
#[async_trait]
pub trait BookingLedger: Send + Sync {
    async fn append(&self, entry: NewLedgerEntry) -> BookingResult<BookingId>;

    /// Newest booking first
    async fn list_by_owner(&self, owner: &OwnerId) -> BookingResult<Vec<LedgerEntry>>;

    /// Deletes the entry only if `owner` owns it, in one atomic step
    async fn remove(&self, booking_id: BookingId, owner: &OwnerId) -> BookingResult<RemoveOutcome>;
}

/// Read-by-id access to service snapshots
#[async_trait]
pub trait ServiceCatalog: Send + Sync {
    async fn get_service(&self, service: ServiceRef) -> BookingResult<Option<ServiceSnapshot>>;
}
