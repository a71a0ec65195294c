use serde::Deserialize;
use std::env;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    #[serde(default)]
    pub inventory: InventoryConfig,
    #[serde(default)]
    pub booking: BookingConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
}

fn default_max_connections() -> u32 { 5 }
fn default_acquire_timeout() -> u64 { 3 }

#[derive(Debug, Deserialize, Clone)]
pub struct RedisConfig {
    pub url: String,
}

/// Where bus and flight seats are tracked
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum InventoryBackend {
    #[default]
    Postgres,
    Redis,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct InventoryConfig {
    #[serde(default)]
    pub backend: InventoryBackend,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BookingConfig {
    #[serde(default = "default_store_timeout")]
    pub store_timeout_ms: u64,
    #[serde(default = "default_release_on_cancel")]
    pub release_on_cancel: bool,
}

fn default_store_timeout() -> u64 { 3000 }
fn default_release_on_cancel() -> bool { true }

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            store_timeout_ms: default_store_timeout(),
            release_on_cancel: default_release_on_cancel(),
        }
    }
}

impl BookingConfig {
    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Per-environment overrides, optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local, never checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Eg. `TRAVELGO__BOOKING__STORE_TIMEOUT_MS=500`
            .add_source(config::Environment::with_prefix("TRAVELGO").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
