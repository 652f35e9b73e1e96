// File: inventory/src/config/mod.rs
pub mod manager;
use serde::{Deserialize, Serialize};
pub use manager::ConfigManager;

use crate::constants::database as db_defaults;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryConfig {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub dcae_controller_connection: DcaeControllerConnection,
    #[serde(default)]
    pub databus_controller_connection: DatabusControllerConnection,
    #[serde(default)]
    pub http_client: HttpClientConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default)]
    pub min_connections: u32,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_seconds: u64,
}

fn default_max_connections() -> u32 {
    db_defaults::MAX_CONNECTIONS
}

fn default_acquire_timeout() -> u64 {
    db_defaults::ACQUIRE_TIMEOUT_SECONDS
}

impl DatabaseConfig {
    /// Settings for a database at `url` with default pool sizing
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: default_max_connections(),
            min_connections: 0,
            acquire_timeout_seconds: default_acquire_timeout(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DcaeControllerConnection {
    #[serde(default)]
    pub required: bool,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub base_path: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabusControllerConnection {
    #[serde(default)]
    pub required: bool,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub mech_id: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpClientConfig {
    #[serde(default = "default_http_timeout")]
    pub timeout_seconds: u64,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_http_timeout(),
        }
    }
}

fn default_http_timeout() -> u64 {
    30
}
