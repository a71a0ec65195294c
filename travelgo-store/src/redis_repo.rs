use async_trait::async_trait;
use redis::AsyncCommands;
use std::collections::HashMap;
use tracing::{debug, info};
use travelgo_core::{BookingResult, InventoryStore, InventoryUnit, ReserveOutcome, ServiceRef, UnitState};
use travelgo_shared::OwnerId;

use crate::storage_failure;

// Free seats hold an empty string, booked seats the owner id
const FREE: &str = "";

// 1 = reserved, 0 = already booked, -1 = no such seat
const RESERVE_SCRIPT: &str = r#"
    local current = redis.call("HGET", KEYS[1], ARGV[1])
    if not current then
        return -1
    end
    if current ~= "" then
        return 0
    end
    redis.call("HSET", KEYS[1], ARGV[1], ARGV[2])
    return 1
"#;

// Only touches seats that exist, so releasing never creates a field
const RELEASE_SCRIPT: &str = r#"
    if redis.call("HEXISTS", KEYS[1], ARGV[1]) == 1 then
        redis.call("HSET", KEYS[1], ARGV[1], "")
    end
    return 1
"#;

/// Seat inventory kept in one Redis hash per service.
///
/// Reservation runs as a Lua script, which Redis executes atomically.
#[derive(Clone)]
pub struct RedisSeatInventory {
    client: redis::Client,
}

fn seats_key(service: ServiceRef) -> String {
    format!("seats:{}:{}", service.kind, service.id)
}

impl RedisSeatInventory {
    pub fn new(connection_string: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(connection_string)?;
        Ok(Self { client })
    }
}

#[async_trait]
impl InventoryStore for RedisSeatInventory {
    async fn reserve_unit(
        &self,
        service: ServiceRef,
        unit_key: &str,
        owner: &OwnerId,
    ) -> BookingResult<ReserveOutcome> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(storage_failure)?;

        let script = redis::Script::new(RESERVE_SCRIPT);
        let outcome: i64 = script
            .key(seats_key(service))
            .arg(unit_key)
            .arg(owner.as_str())
            .invoke_async(&mut conn)
            .await
            .map_err(storage_failure)?;

        Ok(match outcome {
            1 => {
                debug!("Seat {} on {} booked by {}", unit_key, service, owner);
                ReserveOutcome::Reserved
            }
            0 => ReserveOutcome::AlreadyBooked,
            _ => ReserveOutcome::UnknownUnit,
        })
    }

    async fn release_unit(&self, service: ServiceRef, unit_key: &str) -> BookingResult<()> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(storage_failure)?;

        let script = redis::Script::new(RELEASE_SCRIPT);
        let _: i64 = script
            .key(seats_key(service))
            .arg(unit_key)
            .invoke_async(&mut conn)
            .await
            .map_err(storage_failure)?;
        Ok(())
    }

    /// Seats sorted by seat number; Redis hashes carry no insertion order
    async fn list_units(&self, service: ServiceRef) -> BookingResult<Vec<InventoryUnit>> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(storage_failure)?;

        let seats: HashMap<String, String> = conn
            .hgetall(seats_key(service))
            .await
            .map_err(storage_failure)?;

        Ok(to_units(seats))
    }

    async fn seed_units(&self, service: ServiceRef, seat_numbers: &[String]) -> BookingResult<()> {
        if seat_numbers.is_empty() {
            return Ok(());
        }
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(storage_failure)?;
        let key = seats_key(service);

        let mut pipe = redis::pipe();
        pipe.atomic();
        for seat in seat_numbers {
            pipe.hset_nx(&key, seat, FREE).ignore();
        }
        let _: () = pipe.query_async(&mut conn).await.map_err(storage_failure)?;

        info!("Seeded {} seat(s) on {}", seat_numbers.len(), service);
        Ok(())
    }
}

fn to_units(seats: HashMap<String, String>) -> Vec<InventoryUnit> {
    let mut units: Vec<InventoryUnit> = seats
        .into_iter()
        .map(|(unit_key, owner)| InventoryUnit {
            unit_key,
            state: if owner == FREE {
                UnitState::Free
            } else {
                UnitState::Booked(OwnerId(owner))
            },
        })
        .collect();
    units.sort_by(|a, b| a.unit_key.cmp(&b.unit_key));
    units
}

#[cfg(test)]
mod tests {
    use super::*;
    use travelgo_core::ServiceKind;
    use travelgo_shared::ServiceId;

    #[test]
    fn test_keys_are_scoped_by_kind() {
        let bus = ServiceRef::new(ServiceKind::Bus, ServiceId(4));
        let flight = ServiceRef::new(ServiceKind::Flight, ServiceId(4));
        assert_eq!(seats_key(bus), "seats:bus:4");
        assert_eq!(seats_key(flight), "seats:flight:4");
    }

    #[test]
    fn test_hash_fields_become_sorted_units() {
        let mut raw = HashMap::new();
        raw.insert("2B".to_string(), "alice".to_string());
        raw.insert("1A".to_string(), String::new());

        let units = to_units(raw);
        assert_eq!(units[0].unit_key, "1A");
        assert_eq!(units[0].state, UnitState::Free);
        assert_eq!(units[1].state, UnitState::Booked(OwnerId::new("alice")));
    }
}
