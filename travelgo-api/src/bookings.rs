use axum::{
    extract::{rejection::JsonRejection, Extension, Path, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use travelgo_core::{
    Allocation, BookingError, BookingRequest, BookingResult, DetailsRecord, FareClass, LedgerEntry,
    ServiceKind,
};
use travelgo_shared::{BookingId, OwnerId, ServiceId};

use crate::error::AppError;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Seats arrive either as a JSON list or as `"1A, 1B"`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SeatsField {
    List(Vec<String>),
    Csv(String),
}

impl SeatsField {
    fn into_seats(self) -> Vec<String> {
        match self {
            SeatsField::List(seats) => seats.into_iter().map(|s| s.trim().to_string()).collect(),
            SeatsField::Csv(raw) => Allocation::parse_seat_list(&raw),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    #[serde(rename = "type")]
    pub service_type: String,
    pub service_id: Option<i64>,
    pub seats: Option<SeatsField>,
    pub quantity: Option<u32>,
    #[serde(rename = "class")]
    pub fare_class: Option<String>,
    pub date: Option<String>,
}

impl CreateBookingRequest {
    pub fn into_booking_request(self, owner: OwnerId) -> BookingResult<BookingRequest> {
        let kind: ServiceKind = self.service_type.parse()?;
        let service_id = self
            .service_id
            .ok_or_else(|| BookingError::InvalidRequest("service_id is required".to_string()))?;

        let seats = self.seats.map(SeatsField::into_seats).unwrap_or_default();
        let allocation = match kind {
            ServiceKind::Bus => Allocation::Bus { seats },
            ServiceKind::Flight => Allocation::Flight { seats },
            ServiceKind::Train => Allocation::Train {
                quantity: self.quantity.unwrap_or(1),
                fare_class: self
                    .fare_class
                    .as_deref()
                    .map(FareClass::parse)
                    .unwrap_or_default(),
            },
            ServiceKind::Hotel => Allocation::Hotel,
        };

        Ok(BookingRequest {
            owner,
            service_id: ServiceId(service_id),
            allocation,
            travel_date: parse_date(self.date.as_deref())?,
        })
    }
}

fn parse_date(raw: Option<&str>) -> BookingResult<Option<NaiveDate>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| {
                BookingError::InvalidRequest(format!("date '{}' is not YYYY-MM-DD", value))
            }),
    }
}

#[derive(Debug, Serialize)]
pub struct CreateBookingResponse {
    pub status: &'static str,
    pub booking_id: BookingId,
}

#[derive(Debug, Serialize)]
pub struct CancelBookingResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct BookingView {
    pub id: BookingId,
    pub service_type: ServiceKind,
    pub service_id: ServiceId,
    pub details: DetailsRecord,
    pub total_price: String,
    pub booking_date: DateTime<Utc>,
}

impl From<LedgerEntry> for BookingView {
    fn from(entry: LedgerEntry) -> Self {
        BookingView {
            id: entry.id,
            service_type: entry.service_type(),
            service_id: entry.service_id,
            details: entry.details.to_record(),
            total_price: entry.total_price.to_string(),
            booking_date: entry.created_at,
        }
    }
}

// ============================================================================
// Routes
// ============================================================================

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/bookings", get(list_bookings).post(create_booking))
        .route("/v1/bookings/{id}", delete(cancel_booking))
}

async fn create_booking(
    State(state): State<AppState>,
    Extension(owner): Extension<OwnerId>,
    payload: Result<Json<CreateBookingRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateBookingResponse>), AppError> {
    let Json(req) = payload?;
    let request = req.into_booking_request(owner)?;
    let booking_id = state.orchestrator.create_booking(request).await?;

    info!("Booking {} created", booking_id);

    Ok((
        StatusCode::CREATED,
        Json(CreateBookingResponse {
            status: "success",
            booking_id,
        }),
    ))
}

async fn cancel_booking(
    State(state): State<AppState>,
    Extension(owner): Extension<OwnerId>,
    Path(booking_id): Path<i64>,
) -> Result<Json<CancelBookingResponse>, AppError> {
    state
        .orchestrator
        .cancel_booking(&owner, BookingId(booking_id))
        .await?;

    Ok(Json(CancelBookingResponse {
        success: true,
        message: "Booking cancelled successfully.".to_string(),
    }))
}

async fn list_bookings(
    State(state): State<AppState>,
    Extension(owner): Extension<OwnerId>,
) -> Result<Json<Vec<BookingView>>, AppError> {
    let entries = state.orchestrator.list_bookings(&owner).await?;
    Ok(Json(entries.into_iter().map(BookingView::from).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(body: serde_json::Value) -> BookingResult<BookingRequest> {
        let req: CreateBookingRequest = serde_json::from_value(body).unwrap();
        req.into_booking_request(OwnerId::new("alice"))
    }

    #[test]
    fn test_seats_as_comma_string() {
        let request = parse(json!({"type": "bus", "service_id": 3, "seats": "4, 5,,6 "})).unwrap();
        assert_eq!(request.service_id, ServiceId(3));
        assert_eq!(
            request.allocation,
            Allocation::Bus {
                seats: vec!["4".to_string(), "5".to_string(), "6".to_string()]
            }
        );
    }

    #[test]
    fn test_seats_as_list() {
        let request = parse(json!({"type": "Flight", "service_id": 2, "seats": ["12A", "12B"]}))
            .unwrap();
        assert_eq!(request.allocation.seats(), &["12A".to_string(), "12B".to_string()]);
    }

    #[test]
    fn test_train_defaults() {
        let request = parse(json!({"type": "train", "service_id": 7})).unwrap();
        assert_eq!(
            request.allocation,
            Allocation::Train {
                quantity: 1,
                fare_class: FareClass::Sleeper
            }
        );
        assert_eq!(request.travel_date, None);
    }

    #[test]
    fn test_date_parsing() {
        let request =
            parse(json!({"type": "hotel", "service_id": 1, "date": "2026-12-31"})).unwrap();
        assert_eq!(request.travel_date, NaiveDate::from_ymd_opt(2026, 12, 31));

        let err = parse(json!({"type": "hotel", "service_id": 1, "date": "31/12/2026"}))
            .unwrap_err();
        assert!(matches!(err, BookingError::InvalidRequest(_)));
    }

    #[test]
    fn test_unknown_type_and_missing_id() {
        assert!(matches!(
            parse(json!({"type": "ferry", "service_id": 1})).unwrap_err(),
            BookingError::InvalidRequest(_)
        ));
        assert!(matches!(
            parse(json!({"type": "bus", "seats": "1"})).unwrap_err(),
            BookingError::InvalidRequest(_)
        ));
    }
}
