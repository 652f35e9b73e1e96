pub mod config;
pub mod constants;
pub mod database;
pub mod errors;

// Re-export commonly used types
pub use config::{ConfigManager, DatabaseConfig, InventoryConfig};
pub use database::{BootstrapReport, InventoryDao, InventoryDaoManager, LifecycleState};
pub use errors::{DataAccessError, InventoryError, LifecycleError, SchemaBootstrapError};
