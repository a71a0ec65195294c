use serde::Serialize;
use travelgo_core::{Allocation, BookingError, BookingResult, FareClass, ServiceSnapshot};
use travelgo_shared::Money;

/// Fare class multipliers in hundredths (150 = x1.5)
pub fn fare_multiplier(class: &FareClass) -> u32 {
    match class {
        FareClass::Sleeper => 100,
        FareClass::AcChair => 150,
        FareClass::FirstClass => 250,
        FareClass::Other(_) => 100,
    }
}

/// Result of pricing one allocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Quote {
    pub unit_price: Money,
    pub quantity: u32,
    pub total: Money,
}

/// Deterministic price computation from a service snapshot.
///
/// Prices are integer cents. A fare multiplier is applied to the single
/// ticket price (rounded half up) before multiplying by quantity.
#[derive(Debug, Clone, Copy, Default)]
pub struct PricingEngine;

impl PricingEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn quote(&self, snapshot: &ServiceSnapshot, allocation: &Allocation) -> BookingResult<Quote> {
        match (snapshot, allocation) {
            (ServiceSnapshot::Bus(bus), Allocation::Bus { seats }) => per_unit(bus.price, seats.len()),
            (ServiceSnapshot::Flight(flight), Allocation::Flight { seats }) => {
                per_unit(flight.price, seats.len())
            }
            (ServiceSnapshot::Train(train), Allocation::Train { quantity, fare_class }) => {
                let unit_price = train
                    .price
                    .checked_scale(fare_multiplier(fare_class))
                    .ok_or_else(overflow)?;
                let total = unit_price.checked_mul(*quantity).ok_or_else(overflow)?;
                Ok(Quote { unit_price, quantity: *quantity, total })
            }
            (ServiceSnapshot::Hotel(hotel), Allocation::Hotel) => Ok(Quote {
                unit_price: hotel.price_per_night,
                quantity: 1,
                total: hotel.price_per_night,
            }),
            (snapshot, allocation) => Err(BookingError::InvalidRequest(format!(
                "{} allocation cannot be priced against a {} service",
                allocation.kind(),
                snapshot.kind()
            ))),
        }
    }
}

fn per_unit(price: Money, count: usize) -> BookingResult<Quote> {
    let quantity = u32::try_from(count).map_err(|_| overflow())?;
    let total = price.checked_mul(quantity).ok_or_else(overflow)?;
    Ok(Quote { unit_price: price, quantity, total })
}

fn overflow() -> BookingError {
    BookingError::InvalidRequest("requested allocation exceeds the price range".to_string())
}
