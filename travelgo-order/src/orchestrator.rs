use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use travelgo_catalog::PricingEngine;
use travelgo_core::booking::{SeatBookingDetails, StayDetails, TrainBookingDetails};
use travelgo_core::{
    Allocation, BookingDetails, BookingError, BookingLedger, BookingRequest, BookingResult,
    InventoryStore, InventoryUnit, LedgerEntry, NewLedgerEntry, RemoveOutcome, ReserveOutcome,
    ServiceCatalog, ServiceRef, ServiceSnapshot,
};
use travelgo_shared::{BookingId, OwnerId};

#[derive(Debug, Clone)]
pub struct BookingPolicy {
    /// Upper bound for every single store call
    pub store_timeout: Duration,
    /// Free the seats held by a booking when it is cancelled
    pub release_on_cancel: bool,
}

impl Default for BookingPolicy {
    fn default() -> Self {
        Self {
            store_timeout: Duration::from_secs(5),
            release_on_cancel: true,
        }
    }
}

/// Creates and cancels bookings across catalog, inventory and ledger.
///
/// A booking attempt either appends exactly one ledger entry or leaves
/// inventory as it found it: seats reserved by a failed attempt are released
/// before the error is returned.
pub struct BookingOrchestrator {
    catalog: Arc<dyn ServiceCatalog>,
    inventory: Arc<dyn InventoryStore>,
    ledger: Arc<dyn BookingLedger>,
    pricing: PricingEngine,
    policy: BookingPolicy,
}

impl BookingOrchestrator {
    pub fn new(
        catalog: Arc<dyn ServiceCatalog>,
        inventory: Arc<dyn InventoryStore>,
        ledger: Arc<dyn BookingLedger>,
        policy: BookingPolicy,
    ) -> Self {
        Self {
            catalog,
            inventory,
            ledger,
            pricing: PricingEngine::new(),
            policy,
        }
    }

    pub async fn create_booking(&self, request: BookingRequest) -> BookingResult<BookingId> {
        request.allocation.validate()?;
        let service = request.service_ref();

        let snapshot = self
            .bounded("load service", self.catalog.get_service(service))
            .await?
            .ok_or_else(|| BookingError::NotFound(format!("{} not found", service)))?;

        if snapshot.kind() != service.kind {
            return Err(BookingError::InvalidRequest(format!(
                "{} resolved to a {} service",
                service,
                snapshot.kind()
            )));
        }

        let quote = self.pricing.quote(&snapshot, &request.allocation)?;
        let details = describe(&snapshot, &request.allocation, &request)?;

        let held = self
            .reserve_all(service, request.allocation.seats(), &request.owner)
            .await?;

        let entry = NewLedgerEntry {
            owner: request.owner.clone(),
            service_id: request.service_id,
            details,
            total_price: quote.total,
        };

        // The append runs on its own task so a timeout never drops a half-sent insert.
        // Seats are released only once the ledger has definitely refused the entry.
        let ledger = self.ledger.clone();
        let inventory = self.inventory.clone();
        let store_timeout = self.policy.store_timeout;
        let to_release = held.clone();
        let append = tokio::spawn(async move {
            let result = ledger.append(entry).await;
            if let Err(e) = &result {
                warn!(
                    "Ledger append failed for {}: {}. Releasing {} seat(s)",
                    service,
                    e,
                    to_release.len()
                );
                release_units(inventory.as_ref(), store_timeout, service, &to_release).await;
            }
            result
        });

        match tokio::time::timeout(store_timeout, append).await {
            Ok(Ok(Ok(booking_id))) => {
                info!(
                    "Booking {} committed: {} for {} at {}",
                    booking_id, service, request.owner, quote.total
                );
                Ok(booking_id)
            }
            Ok(Ok(Err(e))) => Err(e),
            Ok(Err(join_error)) => {
                error!(
                    "Ledger append for {} by {} aborted ({}); seats {:?} stay held pending reconciliation",
                    service, request.owner, join_error, held
                );
                Err(BookingError::StorageFailure(format!(
                    "append booking aborted: {}",
                    join_error
                )))
            }
            Err(_) => {
                error!(
                    "Ledger append for {} by {} still pending after {:?}; seats {:?} stay held pending reconciliation",
                    service, request.owner, store_timeout, held
                );
                Err(BookingError::StorageFailure(format!(
                    "append booking timed out after {:?}",
                    store_timeout
                )))
            }
        }
    }

    /// Removes the booking if `owner` holds it, then frees its seats when the policy allows
    pub async fn cancel_booking(&self, owner: &OwnerId, booking_id: BookingId) -> BookingResult<LedgerEntry> {
        let outcome = self
            .bounded("remove booking", self.ledger.remove(booking_id, owner))
            .await?;

        match outcome {
            RemoveOutcome::Removed(entry) => {
                if self.policy.release_on_cancel {
                    self.release_all(entry.service_ref(), entry.details.held_units())
                        .await;
                }
                info!("Booking {} cancelled by {}", booking_id, owner);
                Ok(entry)
            }
            RemoveOutcome::NotFoundOrForbidden => {
                warn!("Cancellation of booking {} refused for {}", booking_id, owner);
                Err(BookingError::Forbidden(format!(
                    "booking {} not found or not owned by caller",
                    booking_id
                )))
            }
        }
    }

    pub async fn list_bookings(&self, owner: &OwnerId) -> BookingResult<Vec<LedgerEntry>> {
        self.bounded("list bookings", self.ledger.list_by_owner(owner))
            .await
    }

    /// Seat map of a bus or flight
    pub async fn list_units(&self, service: ServiceRef) -> BookingResult<Vec<InventoryUnit>> {
        if !service.kind.has_seat_inventory() {
            return Err(BookingError::InvalidRequest(format!(
                "{} services are not sold by seat",
                service.kind
            )));
        }

        self.bounded("load service", self.catalog.get_service(service))
            .await?
            .ok_or_else(|| BookingError::NotFound(format!("{} not found", service)))?;

        self.bounded("list seats", self.inventory.list_units(service))
            .await
    }

    /// Reserves seats in sorted order. On the first failure every seat taken so far is released.
    async fn reserve_all(
        &self,
        service: ServiceRef,
        seats: &[String],
        owner: &OwnerId,
    ) -> BookingResult<Vec<String>> {
        let mut ordered: Vec<&String> = seats.iter().collect();
        ordered.sort();

        let mut held: Vec<String> = Vec::with_capacity(ordered.len());
        for seat in ordered {
            let outcome = self
                .bounded("reserve seat", self.inventory.reserve_unit(service, seat, owner))
                .await;

            let failure = match outcome {
                Ok(ReserveOutcome::Reserved) => {
                    held.push(seat.clone());
                    continue;
                }
                Ok(ReserveOutcome::AlreadyBooked) => BookingError::Conflict(format!(
                    "seat {} on {} is already booked",
                    seat, service
                )),
                Ok(ReserveOutcome::UnknownUnit) => BookingError::InvalidRequest(format!(
                    "seat {} does not exist on {}",
                    seat, service
                )),
                Err(e) => e,
            };

            warn!("Reservation on {} failed at seat {}: {}", service, seat, failure);
            self.release_all(service, &held).await;
            return Err(failure);
        }

        Ok(held)
    }

    async fn release_all(&self, service: ServiceRef, seats: &[String]) {
        release_units(self.inventory.as_ref(), self.policy.store_timeout, service, seats).await;
    }

    async fn bounded<T, F>(&self, operation: &str, fut: F) -> BookingResult<T>
    where
        F: Future<Output = BookingResult<T>>,
    {
        match tokio::time::timeout(self.policy.store_timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                error!("{} exceeded {:?}", operation, self.policy.store_timeout);
                Err(BookingError::StorageFailure(format!(
                    "{} timed out after {:?}",
                    operation, self.policy.store_timeout
                )))
            }
        }
    }
}

/// Compensating release. Failures are logged, the remaining seats are still attempted.
async fn release_units(
    inventory: &dyn InventoryStore,
    store_timeout: Duration,
    service: ServiceRef,
    seats: &[String],
) {
    for seat in seats {
        let outcome = tokio::time::timeout(store_timeout, inventory.release_unit(service, seat)).await;
        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(e)) => error!("Failed to release seat {} on {}: {}", seat, service, e),
            Err(_) => error!(
                "Release of seat {} on {} exceeded {:?}",
                seat, service, store_timeout
            ),
        }
    }
}

/// Build the ledger snapshot. A date given by the caller wins over the scheduled one.
fn describe(
    snapshot: &ServiceSnapshot,
    allocation: &Allocation,
    request: &BookingRequest,
) -> BookingResult<BookingDetails> {
    let details = match (snapshot, allocation) {
        (ServiceSnapshot::Bus(bus), Allocation::Bus { seats }) => BookingDetails::Bus(SeatBookingDetails {
            name: bus.name.clone(),
            from: bus.from_city.clone(),
            to: bus.to_city.clone(),
            seats: seats.clone(),
            date: request.travel_date.or(bus.travel_date),
        }),
        (ServiceSnapshot::Flight(flight), Allocation::Flight { seats }) => {
            BookingDetails::Flight(SeatBookingDetails {
                name: flight.display_name(),
                from: flight.origin.clone(),
                to: flight.destination.clone(),
                seats: seats.clone(),
                date: request.travel_date.or(flight.departure_date),
            })
        }
        (ServiceSnapshot::Train(train), Allocation::Train { quantity, fare_class }) => {
            BookingDetails::Train(TrainBookingDetails {
                name: train.name.clone(),
                from: train.origin.clone(),
                to: train.destination.clone(),
                quantity: *quantity,
                fare_class: fare_class.clone(),
                date: request.travel_date.or(train.travel_date),
            })
        }
        (ServiceSnapshot::Hotel(hotel), Allocation::Hotel) => BookingDetails::Hotel(StayDetails {
            name: hotel.name.clone(),
            location: hotel.location.clone(),
            date: request.travel_date,
        }),
        (snapshot, allocation) => {
            return Err(BookingError::InvalidRequest(format!(
                "{} allocation does not match {} service",
                allocation.kind(),
                snapshot.kind()
            )))
        }
    };
    Ok(details)
}
