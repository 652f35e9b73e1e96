// File: inventory/src/config/manager.rs
use super::InventoryConfig;
use anyhow::{anyhow, Result};
use std::path::Path;
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, info};

pub struct ConfigManager {
    current_config: Arc<InventoryConfig>,
}

impl ConfigManager {
    pub async fn new(config_path: impl AsRef<Path>) -> Result<Self> {
        let config = Self::load_configuration(config_path.as_ref()).await?;
        Ok(Self {
            current_config: Arc::new(config),
        })
    }

    pub fn get_current_config(&self) -> Arc<InventoryConfig> {
        self.current_config.clone()
    }

    async fn load_configuration(config_path: &Path) -> Result<InventoryConfig> {
        debug!("Loading inventory config: {}", config_path.display());

        let content = fs::read_to_string(config_path)
            .await
            .map_err(|e| anyhow!("Failed to read config {}: {}", config_path.display(), e))?;

        let config: InventoryConfig = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse {}: {}", config_path.display(), e))?;

        if config.database.url.trim().is_empty() {
            return Err(anyhow!("database.url must not be empty"));
        }
        if config.database.max_connections == 0 {
            return Err(anyhow!("database.max_connections must be at least 1"));
        }
        if config.database.min_connections > config.database.max_connections {
            return Err(anyhow!(
                "database.min_connections ({}) exceeds max_connections ({})",
                config.database.min_connections,
                config.database.max_connections
            ));
        }

        info!(
            "Loaded config: database pool max {} connections, dcae controller required: {}, databus controller required: {}",
            config.database.max_connections,
            config.dcae_controller_connection.required,
            config.databus_controller_connection.required
        );

        Ok(config)
    }
}
