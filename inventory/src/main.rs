// File: inventory/src/main.rs
use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use inventory::constants::DEFAULT_CONFIG_PATH;
use inventory::database::ServiceFilter;
use inventory::{ConfigManager, InventoryConfig, InventoryDaoManager};

#[tokio::main]
async fn main() -> Result<()> {
    let env_filter = EnvFilter::from_default_env()
        .add_directive("inventory=info".parse()?)
        .add_directive("sqlx=warn".parse()?);

    fmt().with_env_filter(env_filter).init();

    info!("Starting DCAE inventory");

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config_manager = ConfigManager::new(&config_path).await?;
    let config = config_manager.get_current_config();
    info!("Configuration loaded from {}", config_path);

    // Setup and schema bootstrap as a single step; nothing is shared until it succeeds
    let manager = Arc::new(InventoryDaoManager::open(config.database.clone()).await?);
    if let Some(report) = manager.bootstrap_report() {
        if report.is_noop() {
            info!("Schema already present, nothing created");
        } else {
            info!("Schema objects created: {}", report.created().join(", "));
        }
    }

    let latest_types = manager.service_types_dao()?.list_latest().await?;
    let active_services = manager
        .services_dao()?
        .list(&ServiceFilter::default())
        .await?;
    info!(
        "Inventory ready: {} latest service types, {} active services",
        latest_types.len(),
        active_services.len()
    );

    log_controller_toggles(&config);

    manager.close().await;
    Ok(())
}

fn log_controller_toggles(config: &InventoryConfig) {
    if config.dcae_controller_connection.required {
        info!("Use of DCAE controller client is required. Turned on.");
    } else {
        warn!("Use of DCAE controller client is *not* required. Turned off.");
    }

    if config.databus_controller_connection.required {
        info!("Use of databus controller client is required. Turned on.");
    } else {
        warn!("Use of databus controller client is *not* required. Turned off.");
    }
}
