use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use travelgo_shared::{Money, ServiceId};

use crate::BookingError;

/// The four kinds of sellable service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceKind {
    Bus,
    Train,
    Flight,
    Hotel,
}

impl ServiceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceKind::Bus => "bus",
            ServiceKind::Train => "train",
            ServiceKind::Flight => "flight",
            ServiceKind::Hotel => "hotel",
        }
    }

    /// Bus and flight seats are tracked unit by unit; trains and hotels are sold by quantity
    pub fn has_seat_inventory(&self) -> bool {
        matches!(self, ServiceKind::Bus | ServiceKind::Flight)
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceKind {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bus" => Ok(ServiceKind::Bus),
            "train" => Ok(ServiceKind::Train),
            "flight" => Ok(ServiceKind::Flight),
            "hotel" => Ok(ServiceKind::Hotel),
            other => Err(BookingError::InvalidRequest(format!(
                "unknown service type '{}'",
                other
            ))),
        }
    }
}

/// Fully qualified service identity. Each kind has its own id space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ServiceRef {
    pub kind: ServiceKind,
    pub id: ServiceId,
}

impl ServiceRef {
    pub fn new(kind: ServiceKind, id: ServiceId) -> Self {
        Self { kind, id }
    }
}

impl fmt::Display for ServiceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusService {
    pub id: ServiceId,
    pub name: String,
    pub from_city: String,
    pub to_city: String,
    pub price: Money,
    pub travel_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainService {
    pub id: ServiceId,
    pub name: String,
    pub origin: String,
    pub destination: String,
    pub price: Money,
    pub travel_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightService {
    pub id: ServiceId,
    pub airline: String,
    pub number: String,
    pub origin: String,
    pub destination: String,
    pub price: Money,
    pub departure_date: Option<NaiveDate>,
}

impl FlightService {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.airline, self.number)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HotelService {
    pub id: ServiceId,
    pub name: String,
    pub location: String,
    pub price_per_night: Money,
}

/// Read-only pricing and description data for one service, fetched once per booking attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServiceSnapshot {
    Bus(BusService),
    Train(TrainService),
    Flight(FlightService),
    Hotel(HotelService),
}

impl ServiceSnapshot {
    pub fn kind(&self) -> ServiceKind {
        match self {
            ServiceSnapshot::Bus(_) => ServiceKind::Bus,
            ServiceSnapshot::Train(_) => ServiceKind::Train,
            ServiceSnapshot::Flight(_) => ServiceKind::Flight,
            ServiceSnapshot::Hotel(_) => ServiceKind::Hotel,
        }
    }

    pub fn id(&self) -> ServiceId {
        match self {
            ServiceSnapshot::Bus(s) => s.id,
            ServiceSnapshot::Train(s) => s.id,
            ServiceSnapshot::Flight(s) => s.id,
            ServiceSnapshot::Hotel(s) => s.id,
        }
    }

    pub fn service_ref(&self) -> ServiceRef {
        ServiceRef::new(self.kind(), self.id())
    }
}
