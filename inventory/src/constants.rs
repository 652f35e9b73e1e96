//! Central repository for schema names and pool defaults

/// Connection pool defaults
pub mod database {
    pub const MAX_CONNECTIONS: u32 = 8;

    pub const ACQUIRE_TIMEOUT_SECONDS: u64 = 30;

    /// Name used in log lines for the pool itself
    pub const POOL_OBJECT: &str = "connection pool";
}

/// Table and view names
pub mod schema {
    pub const SERVICE_TYPES_TABLE: &str = "dcae_service_types";
    pub const SERVICES_TABLE: &str = "dcae_services";
    pub const SERVICE_COMPONENTS_TABLE: &str = "dcae_service_components";
    pub const SERVICES_COMPONENTS_MAPS_TABLE: &str = "dcae_services_components_maps";
    pub const SERVICE_TRANSACTIONS_TABLE: &str = "dcae_service_transactions";

    /// Per type name, the row with the highest version
    pub const SERVICE_TYPES_LATEST_VIEW: &str = "dcae_service_types_latest";
}

/// Default location of the config file
pub const DEFAULT_CONFIG_PATH: &str = "config/inventory.toml";
