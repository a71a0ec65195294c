use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;
use travelgo_core::{
    BookingResult, InventoryStore, InventoryUnit, ReserveOutcome, ServiceRef, UnitState,
};
use travelgo_shared::OwnerId;

/// In-memory seat inventory.
///
/// A single lock guards every seat map, so each compare-and-set is linearizable.
/// Seats keep the order in which they were seeded.
pub struct InventoryManager {
    units: Mutex<HashMap<ServiceRef, Vec<InventoryUnit>>>,
}

impl InventoryManager {
    pub fn new() -> Self {
        Self {
            units: Mutex::new(HashMap::new()),
        }
    }

    /// Add free seats to a service. Seats that already exist are left untouched.
    pub async fn seed<I, S>(&self, service: ServiceRef, unit_keys: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut units = self.units.lock().await;
        let seats = units.entry(service).or_default();
        for key in unit_keys {
            let key = key.into();
            if !seats.iter().any(|u| u.unit_key == key) {
                seats.push(InventoryUnit {
                    unit_key: key,
                    state: UnitState::Free,
                });
            }
        }
    }

    pub async fn state_of(&self, service: ServiceRef, unit_key: &str) -> Option<UnitState> {
        let units = self.units.lock().await;
        units
            .get(&service)?
            .iter()
            .find(|u| u.unit_key == unit_key)
            .map(|u| u.state.clone())
    }

    pub async fn free_count(&self, service: ServiceRef) -> usize {
        let units = self.units.lock().await;
        units
            .get(&service)
            .map(|seats| seats.iter().filter(|u| u.state.is_free()).count())
            .unwrap_or(0)
    }
}

impl Default for InventoryManager {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InventoryStore for InventoryManager {
    async fn reserve_unit(
        &self,
        service: ServiceRef,
        unit_key: &str,
        owner: &OwnerId,
    ) -> BookingResult<ReserveOutcome> {
        let mut units = self.units.lock().await;
        let Some(unit) = units
            .get_mut(&service)
            .and_then(|seats| seats.iter_mut().find(|u| u.unit_key == unit_key))
        else {
            return Ok(ReserveOutcome::UnknownUnit);
        };

        if !unit.state.is_free() {
            return Ok(ReserveOutcome::AlreadyBooked);
        }

        unit.state = UnitState::Booked(owner.clone());
        tracing::debug!("Seat {} on {} booked by {}", unit_key, service, owner);
        Ok(ReserveOutcome::Reserved)
    }

    async fn release_unit(&self, service: ServiceRef, unit_key: &str) -> BookingResult<()> {
        let mut units = self.units.lock().await;
        if let Some(unit) = units
            .get_mut(&service)
            .and_then(|seats| seats.iter_mut().find(|u| u.unit_key == unit_key))
        {
            unit.state = UnitState::Free;
        }
        Ok(())
    }

    async fn list_units(&self, service: ServiceRef) -> BookingResult<Vec<InventoryUnit>> {
        let units = self.units.lock().await;
        Ok(units.get(&service).cloned().unwrap_or_default())
    }

    async fn seed_units(&self, service: ServiceRef, unit_keys: &[String]) -> BookingResult<()> {
        self.seed(service, unit_keys.iter().cloned()).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use travelgo_core::ServiceKind;
    use travelgo_shared::ServiceId;

    fn bus(id: i64) -> ServiceRef {
        ServiceRef::new(ServiceKind::Bus, ServiceId(id))
    }

    #[tokio::test]
    async fn test_reserve_lifecycle() {
        let inventory = InventoryManager::new();
        let service = bus(1);
        inventory.seed(service, ["1", "2", "3"]).await;
        let alice = OwnerId::new("alice");

        assert_eq!(
            inventory.reserve_unit(service, "2", &alice).await.unwrap(),
            ReserveOutcome::Reserved
        );
        assert_eq!(
            inventory.reserve_unit(service, "2", &OwnerId::new("bob")).await.unwrap(),
            ReserveOutcome::AlreadyBooked
        );
        assert_eq!(
            inventory.state_of(service, "2").await,
            Some(UnitState::Booked(alice))
        );
        assert_eq!(inventory.free_count(service).await, 2);

        inventory.release_unit(service, "2").await.unwrap();
        assert_eq!(inventory.state_of(service, "2").await, Some(UnitState::Free));
    }

    #[tokio::test]
    async fn test_unknown_seat() {
        let inventory = InventoryManager::new();
        inventory.seed(bus(1), ["1"]).await;

        let owner = OwnerId::new("alice");
        assert_eq!(
            inventory.reserve_unit(bus(1), "99", &owner).await.unwrap(),
            ReserveOutcome::UnknownUnit
        );
        assert_eq!(
            inventory.reserve_unit(bus(2), "1", &owner).await.unwrap(),
            ReserveOutcome::UnknownUnit
        );
    }

    #[tokio::test]
    async fn test_release_is_idempotent() {
        let inventory = InventoryManager::new();
        inventory.seed(bus(1), ["1"]).await;

        inventory.release_unit(bus(1), "1").await.unwrap();
        inventory.release_unit(bus(1), "1").await.unwrap();
        inventory.release_unit(bus(1), "missing").await.unwrap();
        assert_eq!(inventory.state_of(bus(1), "1").await, Some(UnitState::Free));
    }

    #[tokio::test]
    async fn test_list_keeps_seed_order() {
        let inventory = InventoryManager::new();
        inventory.seed(bus(1), ["10", "2", "1"]).await;
        inventory.seed(bus(1), ["2", "11"]).await;

        let keys: Vec<String> = inventory
            .list_units(bus(1))
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.unit_key)
            .collect();
        assert_eq!(keys, vec!["10", "2", "1", "11"]);
        assert!(inventory.list_units(bus(9)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_bus_and_flight_ids_do_not_collide() {
        let inventory = InventoryManager::new();
        let flight = ServiceRef::new(ServiceKind::Flight, ServiceId(1));
        inventory.seed(bus(1), ["1A"]).await;
        inventory.seed(flight, ["1A"]).await;

        let owner = OwnerId::new("alice");
        inventory.reserve_unit(bus(1), "1A", &owner).await.unwrap();
        assert_eq!(inventory.state_of(flight, "1A").await, Some(UnitState::Free));
    }

    #[tokio::test]
    async fn test_concurrent_reservations_have_one_winner() {
        let inventory = Arc::new(InventoryManager::new());
        inventory.seed(bus(1), ["7"]).await;

        let mut handles = Vec::new();
        for i in 0..32 {
            let inventory = inventory.clone();
            handles.push(tokio::spawn(async move {
                let owner = OwnerId::new(format!("user-{}", i));
                inventory.reserve_unit(bus(1), "7", &owner).await.unwrap()
            }));
        }

        let mut reserved = 0;
        for handle in handles {
            if handle.await.unwrap() == ReserveOutcome::Reserved {
                reserved += 1;
            }
        }
        assert_eq!(reserved, 1);
    }
}
