use std::sync::Arc;
use travelgo_order::BookingOrchestrator;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
}

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<BookingOrchestrator>,
    pub auth: AuthConfig,
}
