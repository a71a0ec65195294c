use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use travelgo_core::{InventoryUnit, ServiceKind, ServiceRef};
use travelgo_shared::ServiceId;

use crate::error::AppError;
use crate::state::AppState;

/// A seat as shown to any caller. Who holds it stays private.
#[derive(Debug, Serialize)]
pub struct SeatView {
    pub seat_number: String,
    pub is_booked: bool,
}

impl From<InventoryUnit> for SeatView {
    fn from(unit: InventoryUnit) -> Self {
        SeatView {
            is_booked: !unit.state.is_free(),
            seat_number: unit.unit_key,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SeatMapResponse {
    pub service_type: ServiceKind,
    pub service_id: ServiceId,
    pub available: usize,
    pub seats: Vec<SeatView>,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/services/{service_type}/{id}/seats", get(seat_map))
}

async fn seat_map(
    State(state): State<AppState>,
    Path((service_type, id)): Path<(String, i64)>,
) -> Result<Json<SeatMapResponse>, AppError> {
    let kind: ServiceKind = service_type.parse()?;
    let service = ServiceRef::new(kind, ServiceId(id));

    let seats: Vec<SeatView> = state
        .orchestrator
        .list_units(service)
        .await?
        .into_iter()
        .map(SeatView::from)
        .collect();
    let available = seats.iter().filter(|s| !s.is_booked).count();

    Ok(Json(SeatMapResponse {
        service_type: kind,
        service_id: service.id,
        available,
        seats,
    }))
}
