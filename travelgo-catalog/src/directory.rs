use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use travelgo_core::{BookingResult, ServiceCatalog, ServiceRef, ServiceSnapshot};

/// In-memory catalog of service snapshots, keyed by kind and id
pub struct ServiceDirectory {
    services: RwLock<HashMap<ServiceRef, ServiceSnapshot>>,
}

impl ServiceDirectory {
    pub fn new() -> Self {
        Self {
            services: RwLock::new(HashMap::new()),
        }
    }

    /// Insert or replace a snapshot
    pub async fn insert(&self, snapshot: ServiceSnapshot) {
        let mut services = self.services.write().await;
        services.insert(snapshot.service_ref(), snapshot);
    }

    pub async fn len(&self) -> usize {
        self.services.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.services.read().await.is_empty()
    }
}

impl Default for ServiceDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ServiceCatalog for ServiceDirectory {
    async fn get_service(&self, service: ServiceRef) -> BookingResult<Option<ServiceSnapshot>> {
        Ok(self.services.read().await.get(&service).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use travelgo_core::service::HotelService;
    use travelgo_core::ServiceKind;
    use travelgo_shared::{Money, ServiceId};

    #[tokio::test]
    async fn test_lookup_is_scoped_by_kind() {
        let directory = ServiceDirectory::new();
        directory
            .insert(ServiceSnapshot::Hotel(HotelService {
                id: ServiceId(4),
                name: "Lake View".to_string(),
                location: "Udaipur".to_string(),
                price_per_night: Money::from_cents(500000),
            }))
            .await;

        let hotel = ServiceRef::new(ServiceKind::Hotel, ServiceId(4));
        let bus = ServiceRef::new(ServiceKind::Bus, ServiceId(4));
        assert!(directory.get_service(hotel).await.unwrap().is_some());
        assert!(directory.get_service(bus).await.unwrap().is_none());
        assert_eq!(directory.len().await, 1);
    }
}
