use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use travelgo_shared::{OwnerId, ServiceId};

use crate::service::{ServiceKind, ServiceRef};
use crate::{BookingError, BookingResult};

/// Train ticket pricing tier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FareClass {
    #[default]
    Sleeper,
    AcChair,
    FirstClass,
    /// Any class name outside the fare table. Priced like Sleeper.
    Other(String),
}

impl FareClass {
    pub fn parse(name: &str) -> Self {
        match name.trim() {
            "Sleeper" => FareClass::Sleeper,
            "AC Chair" => FareClass::AcChair,
            "First Class" => FareClass::FirstClass,
            other => FareClass::Other(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            FareClass::Sleeper => "Sleeper",
            FareClass::AcChair => "AC Chair",
            FareClass::FirstClass => "First Class",
            FareClass::Other(name) => name,
        }
    }
}

impl fmt::Display for FareClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<String> for FareClass {
    fn from(value: String) -> Self {
        FareClass::parse(&value)
    }
}

impl From<FareClass> for String {
    fn from(value: FareClass) -> Self {
        value.label().to_string()
    }
}

/// What the caller wants to buy, shaped per service kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Allocation {
    Bus { seats: Vec<String> },
    Train { quantity: u32, fare_class: FareClass },
    Flight { seats: Vec<String> },
    /// One room for one night
    Hotel,
}

impl Allocation {
    pub fn kind(&self) -> ServiceKind {
        match self {
            Allocation::Bus { .. } => ServiceKind::Bus,
            Allocation::Train { .. } => ServiceKind::Train,
            Allocation::Flight { .. } => ServiceKind::Flight,
            Allocation::Hotel => ServiceKind::Hotel,
        }
    }

    /// Seat numbers requested, in caller order. Empty for trains and hotels.
    pub fn seats(&self) -> &[String] {
        match self {
            Allocation::Bus { seats } | Allocation::Flight { seats } => seats,
            Allocation::Train { .. } | Allocation::Hotel => &[],
        }
    }

    /// Splits a comma separated seat list such as `"A1, A2"`, dropping empty segments
    pub fn parse_seat_list(raw: &str) -> Vec<String> {
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Shape checks that need no storage access
    pub fn validate(&self) -> BookingResult<()> {
        match self {
            Allocation::Bus { seats } | Allocation::Flight { seats } => {
                if seats.is_empty() {
                    return Err(BookingError::InvalidRequest(format!(
                        "no seats selected for {} booking",
                        self.kind()
                    )));
                }
                let mut seen = HashSet::with_capacity(seats.len());
                for seat in seats {
                    if seat.trim().is_empty() {
                        return Err(BookingError::InvalidRequest(
                            "seat number must not be blank".to_string(),
                        ));
                    }
                    // Stored seat lists are comma separated
                    if seat.contains(',') {
                        return Err(BookingError::InvalidRequest(format!(
                            "seat number '{}' must not contain ','",
                            seat
                        )));
                    }
                    if !seen.insert(seat.as_str()) {
                        return Err(BookingError::InvalidRequest(format!(
                            "seat {} selected more than once",
                            seat
                        )));
                    }
                }
                Ok(())
            }
            Allocation::Train { quantity, .. } => {
                if *quantity == 0 {
                    return Err(BookingError::InvalidRequest(
                        "ticket quantity must be at least 1".to_string(),
                    ));
                }
                Ok(())
            }
            Allocation::Hotel => Ok(()),
        }
    }
}

/// Input to `BookingOrchestrator::create_booking`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRequest {
    pub owner: OwnerId,
    pub service_id: ServiceId,
    pub allocation: Allocation,
    pub travel_date: Option<NaiveDate>,
}

impl BookingRequest {
    pub fn service_ref(&self) -> ServiceRef {
        ServiceRef::new(self.allocation.kind(), self.service_id)
    }
}
