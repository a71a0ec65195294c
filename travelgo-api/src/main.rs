use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use travelgo_api::{app, AppState, AuthConfig};
use travelgo_core::InventoryStore;
use travelgo_order::{BookingOrchestrator, BookingPolicy};
use travelgo_store::app_config::{Config, InventoryBackend};
use travelgo_store::{
    mirror_layout, DbClient, PgBookingLedger, PgSeatInventory, PgServiceCatalog,
    RedisSeatInventory,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "travelgo_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting TravelGo API on port {}", config.server.port);

    let db = DbClient::new(&config.database)
        .await
        .context("Failed to connect to Postgres")?;
    db.migrate().await.context("Failed to run migrations")?;

    let pg_seats = PgSeatInventory::new(db.pool.clone());
    let inventory: Arc<dyn InventoryStore> = match config.inventory.backend {
        InventoryBackend::Postgres => Arc::new(pg_seats),
        InventoryBackend::Redis => {
            let redis_seats =
                RedisSeatInventory::new(&config.redis.url).context("Invalid Redis URL")?;
            // Seat layouts live in Postgres; Redis only tracks who holds them
            let layout = pg_seats
                .seat_layout()
                .await
                .context("Failed to read seat layout")?;
            mirror_layout(&layout, &redis_seats)
                .await
                .context("Failed to seed Redis seat inventory")?;
            Arc::new(redis_seats)
        }
    };
    tracing::info!("Seat inventory backend: {:?}", config.inventory.backend);

    let policy = BookingPolicy {
        store_timeout: config.booking.store_timeout(),
        release_on_cancel: config.booking.release_on_cancel,
    };
    let orchestrator = BookingOrchestrator::new(
        Arc::new(PgServiceCatalog::new(db.pool.clone())),
        inventory,
        Arc::new(PgBookingLedger::new(db.pool.clone())),
        policy,
    );

    let app_state = AppState {
        orchestrator: Arc::new(orchestrator),
        auth: AuthConfig {
            secret: config.auth.jwt_secret.clone(),
        },
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app(app_state)).await?;
    Ok(())
}
