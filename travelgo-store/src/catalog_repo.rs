use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use travelgo_core::service::{BusService, FlightService, HotelService, TrainService};
use travelgo_core::{BookingResult, ServiceCatalog, ServiceKind, ServiceRef, ServiceSnapshot};
use travelgo_shared::{Money, ServiceId};

use crate::storage_failure;

pub struct PgServiceCatalog {
    pool: PgPool,
}

impl PgServiceCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal structs for type-safe querying
#[derive(sqlx::FromRow)]
struct BusRow {
    id: i64,
    name: String,
    from_city: String,
    to_city: String,
    price_cents: i64,
    travel_date: Option<NaiveDate>,
}

#[derive(sqlx::FromRow)]
struct TrainRow {
    id: i64,
    name: String,
    origin: String,
    destination: String,
    price_cents: i64,
    travel_date: Option<NaiveDate>,
}

#[derive(sqlx::FromRow)]
struct FlightRow {
    id: i64,
    airline: String,
    number: String,
    origin: String,
    destination: String,
    price_cents: i64,
    departure_date: Option<NaiveDate>,
}

#[derive(sqlx::FromRow)]
struct HotelRow {
    id: i64,
    name: String,
    location: String,
    price_per_night_cents: i64,
}

impl From<BusRow> for ServiceSnapshot {
    fn from(row: BusRow) -> Self {
        ServiceSnapshot::Bus(BusService {
            id: ServiceId(row.id),
            name: row.name,
            from_city: row.from_city,
            to_city: row.to_city,
            price: Money::from_cents(row.price_cents),
            travel_date: row.travel_date,
        })
    }
}

impl From<TrainRow> for ServiceSnapshot {
    fn from(row: TrainRow) -> Self {
        ServiceSnapshot::Train(TrainService {
            id: ServiceId(row.id),
            name: row.name,
            origin: row.origin,
            destination: row.destination,
            price: Money::from_cents(row.price_cents),
            travel_date: row.travel_date,
        })
    }
}

impl From<FlightRow> for ServiceSnapshot {
    fn from(row: FlightRow) -> Self {
        ServiceSnapshot::Flight(FlightService {
            id: ServiceId(row.id),
            airline: row.airline,
            number: row.number,
            origin: row.origin,
            destination: row.destination,
            price: Money::from_cents(row.price_cents),
            departure_date: row.departure_date,
        })
    }
}

impl From<HotelRow> for ServiceSnapshot {
    fn from(row: HotelRow) -> Self {
        ServiceSnapshot::Hotel(HotelService {
            id: ServiceId(row.id),
            name: row.name,
            location: row.location,
            price_per_night: Money::from_cents(row.price_per_night_cents),
        })
    }
}

#[async_trait]
impl ServiceCatalog for PgServiceCatalog {
    async fn get_service(&self, service: ServiceRef) -> BookingResult<Option<ServiceSnapshot>> {
        let id = service.id.0;
        let snapshot = match service.kind {
            ServiceKind::Bus => sqlx::query_as::<_, BusRow>(
                "SELECT id, name, from_city, to_city, price_cents, travel_date FROM buses WHERE id = $1",
            )
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_failure)?
            .map(ServiceSnapshot::from),

            ServiceKind::Train => sqlx::query_as::<_, TrainRow>(
                "SELECT id, name, origin, destination, price_cents, travel_date FROM trains WHERE id = $1",
            )
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_failure)?
            .map(ServiceSnapshot::from),

            ServiceKind::Flight => sqlx::query_as::<_, FlightRow>(
                r#"
                SELECT id, airline, number, origin, destination, price_cents, departure_date
                FROM flights WHERE id = $1
                "#,
            )
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_failure)?
            .map(ServiceSnapshot::from),

            ServiceKind::Hotel => sqlx::query_as::<_, HotelRow>(
                "SELECT id, name, location, price_per_night_cents FROM hotels WHERE id = $1",
            )
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_failure)?
            .map(ServiceSnapshot::from),
        };

        Ok(snapshot)
    }
}
