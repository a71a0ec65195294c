use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use travelgo_shared::{BookingId, Money, OwnerId, ServiceId};

use crate::allocation::FareClass;
use crate::service::{ServiceKind, ServiceRef};
use crate::{BookingError, BookingResult};

const NOT_AVAILABLE: &str = "N/A";
const SEAT_SEPARATOR: &str = ", ";
const TICKETS_MARKER: &str = " ticket(s) in ";
const ONE_NIGHT_STAY: &str = "1 Night Stay";

/// Bus or flight booking: the seats it holds plus the route snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatBookingDetails {
    pub name: String,
    pub from: String,
    pub to: String,
    pub seats: Vec<String>,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainBookingDetails {
    pub name: String,
    pub from: String,
    pub to: String,
    pub quantity: u32,
    pub fare_class: FareClass,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StayDetails {
    pub name: String,
    pub location: String,
    pub date: Option<NaiveDate>,
}

/// Denormalized description of what was booked
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BookingDetails {
    Bus(SeatBookingDetails),
    Train(TrainBookingDetails),
    Flight(SeatBookingDetails),
    Hotel(StayDetails),
}

/// Flat persisted form of [`BookingDetails`].
///
/// Keys are `name`, `from`, `to`, `date` and either `seats` or `details`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailsRecord {
    pub name: String,
    pub from: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seats: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    pub date: String,
}

fn date_label(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

fn parse_date_label(label: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(label, "%Y-%m-%d").ok()
}

impl BookingDetails {
    pub fn kind(&self) -> ServiceKind {
        match self {
            BookingDetails::Bus(_) => ServiceKind::Bus,
            BookingDetails::Train(_) => ServiceKind::Train,
            BookingDetails::Flight(_) => ServiceKind::Flight,
            BookingDetails::Hotel(_) => ServiceKind::Hotel,
        }
    }

    /// Inventory units this booking holds exclusively
    pub fn held_units(&self) -> &[String] {
        match self {
            BookingDetails::Bus(d) | BookingDetails::Flight(d) => &d.seats,
            BookingDetails::Train(_) | BookingDetails::Hotel(_) => &[],
        }
    }

    pub fn to_record(&self) -> DetailsRecord {
        match self {
            BookingDetails::Bus(d) | BookingDetails::Flight(d) => DetailsRecord {
                name: d.name.clone(),
                from: d.from.clone(),
                to: d.to.clone(),
                seats: Some(d.seats.join(SEAT_SEPARATOR)),
                details: None,
                date: date_label(d.date),
            },
            BookingDetails::Train(d) => DetailsRecord {
                name: d.name.clone(),
                from: d.from.clone(),
                to: d.to.clone(),
                seats: None,
                details: Some(format!("{}{}{}", d.quantity, TICKETS_MARKER, d.fare_class)),
                date: date_label(d.date),
            },
            BookingDetails::Hotel(d) => DetailsRecord {
                name: d.name.clone(),
                from: d.location.clone(),
                to: NOT_AVAILABLE.to_string(),
                seats: None,
                details: Some(ONE_NIGHT_STAY.to_string()),
                date: date_label(d.date),
            },
        }
    }

    pub fn from_record(kind: ServiceKind, record: DetailsRecord) -> BookingResult<Self> {
        let date = parse_date_label(&record.date);
        let details = match kind {
            ServiceKind::Bus | ServiceKind::Flight => {
                let seats = record
                    .seats
                    .as_deref()
                    .map(|s| {
                        s.split(SEAT_SEPARATOR.trim())
                            .map(str::trim)
                            .filter(|seat| !seat.is_empty())
                            .map(str::to_string)
                            .collect()
                    })
                    .unwrap_or_default();
                let seat_details = SeatBookingDetails {
                    name: record.name,
                    from: record.from,
                    to: record.to,
                    seats,
                    date,
                };
                if kind == ServiceKind::Bus {
                    BookingDetails::Bus(seat_details)
                } else {
                    BookingDetails::Flight(seat_details)
                }
            }
            ServiceKind::Train => {
                let description = record.details.unwrap_or_default();
                let (quantity, class) = description.split_once(TICKETS_MARKER).ok_or_else(|| {
                    BookingError::StorageFailure(format!(
                        "unreadable train booking details '{}'",
                        description
                    ))
                })?;
                let quantity = quantity.trim().parse::<u32>().map_err(|_| {
                    BookingError::StorageFailure(format!(
                        "unreadable train ticket quantity '{}'",
                        quantity
                    ))
                })?;
                BookingDetails::Train(TrainBookingDetails {
                    name: record.name,
                    from: record.from,
                    to: record.to,
                    quantity,
                    fare_class: FareClass::parse(class),
                    date,
                })
            }
            ServiceKind::Hotel => BookingDetails::Hotel(StayDetails {
                name: record.name,
                location: record.from,
                date,
            }),
        };
        Ok(details)
    }

    pub fn to_json(&self) -> serde_json::Value {
        // DetailsRecord only holds strings, serialization cannot fail
        serde_json::to_value(self.to_record()).unwrap_or(serde_json::Value::Null)
    }

    pub fn from_json(kind: ServiceKind, value: serde_json::Value) -> BookingResult<Self> {
        let record: DetailsRecord = serde_json::from_value(value)
            .map_err(|e| BookingError::StorageFailure(format!("corrupt booking details: {}", e)))?;
        Self::from_record(kind, record)
    }
}

/// A ledger entry before it has been committed and numbered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLedgerEntry {
    pub owner: OwnerId,
    pub service_id: ServiceId,
    pub details: BookingDetails,
    pub total_price: Money,
}

/// A committed booking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: BookingId,
    pub owner: OwnerId,
    pub service_id: ServiceId,
    pub details: BookingDetails,
    pub total_price: Money,
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    pub fn service_type(&self) -> ServiceKind {
        self.details.kind()
    }

    pub fn service_ref(&self) -> ServiceRef {
        ServiceRef::new(self.details.kind(), self.service_id)
    }
}
