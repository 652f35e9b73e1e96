//! Test database utilities backed by temporary SQLite files

use inventory::{DatabaseConfig, InventoryDaoManager};
use std::path::PathBuf;
use tempfile::TempDir;

/// A throwaway SQLite file that lives as long as this value
pub struct TestDatabase {
    temp_dir: TempDir,
    config: DatabaseConfig,
}

impl TestDatabase {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("data").join("inventory.db");
        let config = DatabaseConfig {
            url: format!("sqlite:{}", path.display()),
            max_connections: 4,
            min_connections: 0,
            acquire_timeout_seconds: 5,
        };
        Self { temp_dir, config }
    }

    pub fn config(&self) -> DatabaseConfig {
        self.config.clone()
    }

    pub fn path(&self) -> PathBuf {
        self.temp_dir.path().join("data").join("inventory.db")
    }

    /// A manager that has been set up but not initialized
    pub fn configured_manager(&self) -> InventoryDaoManager {
        let manager = InventoryDaoManager::new();
        manager
            .setup(self.config())
            .expect("setup on a fresh manager");
        manager
    }

    /// A ready manager over this database
    pub async fn open(&self) -> InventoryDaoManager {
        InventoryDaoManager::open(self.config())
            .await
            .expect("Failed to open inventory database")
    }
}
