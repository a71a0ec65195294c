use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;
use travelgo_core::{
    BookingDetails, BookingLedger, BookingResult, LedgerEntry, NewLedgerEntry, RemoveOutcome,
    ServiceKind,
};
use travelgo_shared::{BookingId, Money, OwnerId, ServiceId};

use crate::storage_failure;

pub struct PgBookingLedger {
    pool: PgPool,
}

impl PgBookingLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: i64,
    user_id: String,
    service_type: String,
    service_id: i64,
    details: Value,
    total_price_cents: i64,
    booking_date: DateTime<Utc>,
}

impl TryFrom<BookingRow> for LedgerEntry {
    type Error = travelgo_core::BookingError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        let kind: ServiceKind = row.service_type.parse().map_err(|_| {
            storage_failure(format!(
                "booking {} has unknown service_type '{}'",
                row.id, row.service_type
            ))
        })?;

        Ok(LedgerEntry {
            id: BookingId(row.id),
            owner: OwnerId(row.user_id),
            service_id: ServiceId(row.service_id),
            details: BookingDetails::from_json(kind, row.details)?,
            total_price: Money::from_cents(row.total_price_cents),
            created_at: row.booking_date,
        })
    }
}

const BOOKING_COLUMNS: &str =
    "id, user_id, service_type, service_id, details, total_price_cents, booking_date";

#[async_trait]
impl BookingLedger for PgBookingLedger {
    async fn append(&self, entry: NewLedgerEntry) -> BookingResult<BookingId> {
        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO bookings (user_id, service_type, service_id, details, total_price_cents)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(entry.owner.as_str())
        .bind(entry.details.kind().as_str())
        .bind(entry.service_id.0)
        .bind(entry.details.to_json())
        .bind(entry.total_price.cents())
        .fetch_one(&self.pool)
        .await
        .map_err(storage_failure)?;

        Ok(BookingId(id))
    }

    async fn list_by_owner(&self, owner: &OwnerId) -> BookingResult<Vec<LedgerEntry>> {
        let sql = format!(
            "SELECT {} FROM bookings WHERE user_id = $1 ORDER BY booking_date DESC, id DESC",
            BOOKING_COLUMNS
        );
        let rows: Vec<BookingRow> = sqlx::query_as(&sql)
            .bind(owner.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(storage_failure)?;

        rows.into_iter().map(LedgerEntry::try_from).collect()
    }

    async fn remove(&self, booking_id: BookingId, owner: &OwnerId) -> BookingResult<RemoveOutcome> {
        // Ownership is part of the DELETE predicate, there is no separate read
        let sql = format!(
            "DELETE FROM bookings WHERE id = $1 AND user_id = $2 RETURNING {}",
            BOOKING_COLUMNS
        );
        let row: Option<BookingRow> = sqlx::query_as(&sql)
            .bind(booking_id.0)
            .bind(owner.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_failure)?;

        match row {
            Some(row) => Ok(RemoveOutcome::Removed(LedgerEntry::try_from(row)?)),
            None => Ok(RemoveOutcome::NotFoundOrForbidden),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_row_converts_to_entry() {
        let row = BookingRow {
            id: 41,
            user_id: "alice".to_string(),
            service_type: "flight".to_string(),
            service_id: 3,
            details: json!({
                "name": "IndiGo 6E 201",
                "from": "BOM",
                "to": "DEL",
                "seats": "12A, 12B",
                "date": "2026-12-01"
            }),
            total_price_cents: 1_100_000,
            booking_date: Utc::now(),
        };

        let entry = LedgerEntry::try_from(row).unwrap();
        assert_eq!(entry.id, BookingId(41));
        assert_eq!(entry.service_type(), ServiceKind::Flight);
        assert_eq!(entry.details.held_units(), &["12A".to_string(), "12B".to_string()]);
        assert_eq!(entry.total_price.to_string(), "11000.00");
    }

    #[test]
    fn test_unknown_service_type_is_storage_failure() {
        let row = BookingRow {
            id: 1,
            user_id: "alice".to_string(),
            service_type: "ferry".to_string(),
            service_id: 1,
            details: json!({}),
            total_price_cents: 0,
            booking_date: Utc::now(),
        };
        let err = LedgerEntry::try_from(row).unwrap_err();
        assert!(err.is_retryable());
    }
}
