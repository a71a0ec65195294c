use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, info};
use travelgo_core::{
    BookingResult, InventoryStore, InventoryUnit, ReserveOutcome, ServiceKind, ServiceRef,
    UnitState,
};
use travelgo_shared::{OwnerId, ServiceId};

use crate::storage_failure;

/// Seat inventory in `bus_seats` / `flight_seats`.
///
/// A reservation is a single conditional UPDATE guarded by `booked_by IS NULL`,
/// so Postgres row locking decides the winner between concurrent callers.
pub struct PgSeatInventory {
    pool: PgPool,
}

struct SeatTable {
    table: &'static str,
    service_column: &'static str,
}

fn seat_table(kind: ServiceKind) -> Option<SeatTable> {
    match kind {
        ServiceKind::Bus => Some(SeatTable {
            table: "bus_seats",
            service_column: "service_id",
        }),
        ServiceKind::Flight => Some(SeatTable {
            table: "flight_seats",
            service_column: "flight_id",
        }),
        ServiceKind::Train | ServiceKind::Hotel => None,
    }
}

impl PgSeatInventory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Every seat of every bus and flight, grouped per service in insertion order
    pub async fn seat_layout(&self) -> BookingResult<Vec<(ServiceRef, Vec<String>)>> {
        let mut layout = Vec::new();
        for kind in [ServiceKind::Bus, ServiceKind::Flight] {
            let Some(seats) = seat_table(kind) else {
                continue;
            };
            let select = format!(
                "SELECT {}, seat_number FROM {} ORDER BY {}, id",
                seats.service_column, seats.table, seats.service_column
            );
            let rows: Vec<(i64, String)> = sqlx::query_as(&select)
                .fetch_all(&self.pool)
                .await
                .map_err(storage_failure)?;
            layout.extend(group_layout(kind, rows));
        }
        Ok(layout)
    }
}

#[async_trait]
impl InventoryStore for PgSeatInventory {
    async fn reserve_unit(
        &self,
        service: ServiceRef,
        unit_key: &str,
        owner: &OwnerId,
    ) -> BookingResult<ReserveOutcome> {
        let Some(seats) = seat_table(service.kind) else {
            return Ok(ReserveOutcome::UnknownUnit);
        };

        let update = format!(
            "UPDATE {} SET booked_by = $1 WHERE {} = $2 AND seat_number = $3 AND booked_by IS NULL",
            seats.table, seats.service_column
        );
        let result = sqlx::query(&update)
            .bind(owner.as_str())
            .bind(service.id.0)
            .bind(unit_key)
            .execute(&self.pool)
            .await
            .map_err(storage_failure)?;

        if result.rows_affected() == 1 {
            debug!("Seat {} on {} booked by {}", unit_key, service, owner);
            return Ok(ReserveOutcome::Reserved);
        }

        // Lost the race or the seat does not exist
        let exists = format!(
            "SELECT 1 FROM {} WHERE {} = $1 AND seat_number = $2",
            seats.table, seats.service_column
        );
        let row: Option<(i32,)> = sqlx::query_as(&exists)
            .bind(service.id.0)
            .bind(unit_key)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_failure)?;

        Ok(match row {
            Some(_) => ReserveOutcome::AlreadyBooked,
            None => ReserveOutcome::UnknownUnit,
        })
    }

    async fn release_unit(&self, service: ServiceRef, unit_key: &str) -> BookingResult<()> {
        let Some(seats) = seat_table(service.kind) else {
            return Ok(());
        };

        let update = format!(
            "UPDATE {} SET booked_by = NULL WHERE {} = $1 AND seat_number = $2",
            seats.table, seats.service_column
        );
        sqlx::query(&update)
            .bind(service.id.0)
            .bind(unit_key)
            .execute(&self.pool)
            .await
            .map_err(storage_failure)?;
        Ok(())
    }

    async fn list_units(&self, service: ServiceRef) -> BookingResult<Vec<InventoryUnit>> {
        let Some(seats) = seat_table(service.kind) else {
            return Ok(Vec::new());
        };

        let select = format!(
            "SELECT seat_number, booked_by FROM {} WHERE {} = $1 ORDER BY id",
            seats.table, seats.service_column
        );
        let rows: Vec<(String, Option<String>)> = sqlx::query_as(&select)
            .bind(service.id.0)
            .fetch_all(&self.pool)
            .await
            .map_err(storage_failure)?;

        Ok(rows
            .into_iter()
            .map(|(seat_number, booked_by)| InventoryUnit {
                unit_key: seat_number,
                state: booked_by.map(OwnerId).map_or(UnitState::Free, UnitState::Booked),
            })
            .collect())
    }

    /// Inserts free seats, skipping any that already exist
    async fn seed_units(&self, service: ServiceRef, seat_numbers: &[String]) -> BookingResult<()> {
        let Some(seats) = seat_table(service.kind) else {
            return Ok(());
        };
        let sql = format!(
            "INSERT INTO {} ({}, seat_number) VALUES ($1, $2) ON CONFLICT DO NOTHING",
            seats.table, seats.service_column
        );

        let mut tx = self.pool.begin().await.map_err(storage_failure)?;
        for seat in seat_numbers {
            sqlx::query(&sql)
                .bind(service.id.0)
                .bind(seat)
                .execute(&mut *tx)
                .await
                .map_err(storage_failure)?;
        }
        tx.commit().await.map_err(storage_failure)?;
        Ok(())
    }
}

fn group_layout(kind: ServiceKind, rows: Vec<(i64, String)>) -> Vec<(ServiceRef, Vec<String>)> {
    let mut layout: Vec<(ServiceRef, Vec<String>)> = Vec::new();
    for (service_id, seat_number) in rows {
        let service = ServiceRef::new(kind, ServiceId(service_id));
        match layout.last_mut() {
            Some((current, seats)) if *current == service => seats.push(seat_number),
            _ => layout.push((service, vec![seat_number])),
        }
    }
    layout
}

/// Copies a seat layout into another inventory, e.g. Postgres seats into Redis at start-up.
/// Seats the target already knows keep their state. Returns the number of seats offered.
pub async fn mirror_layout(
    layout: &[(ServiceRef, Vec<String>)],
    target: &dyn InventoryStore,
) -> BookingResult<usize> {
    let mut total = 0;
    for (service, seats) in layout {
        target.seed_units(*service, seats).await?;
        total += seats.len();
    }
    info!("Mirrored {} seat(s) across {} service(s)", total, layout.len());
    Ok(total)
}
