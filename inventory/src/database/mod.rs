//! Database layer for the inventory.
//!
//! This module provides SQLite persistence for:
//! - Service types (versioned, with a latest-version view)
//! - Service instances and their components
//! - Service/component mappings and the service transaction audit log
//!
//! The module is organized into submodules:
//! - `records` - All record types (entities)
//! - `bootstrap` - Idempotent schema creation
//! - `query` - Bound `IN` list predicates
//! - one module per entity DAO
//!
//! [`InventoryDaoManager`] owns the connection pool and hands out DAOs. It moves
//! through `Uninitialized` -> `Configured` (after `setup`) -> `Ready` (after
//! `initialize`). [`InventoryDaoManager::open`] does both steps at once and is
//! the preferred way to build one.

mod bootstrap;
mod component_maps;
mod components;
mod query;
mod records;
mod service_types;
mod services;
mod transactions;

pub use bootstrap::{
    bootstrap_schema, BootstrapOutcome, BootstrapReport, BootstrapStep, SchemaObjectKind,
};
pub use component_maps::ServicesComponentsMapsDao;
pub use components::ServiceComponentsDao;
pub use query::InList;
pub use records::*;
pub use service_types::ServiceTypesDao;
pub use services::ServicesDao;
pub use transactions::ServiceTransactionsDao;

use async_trait::async_trait;
use sqlx::pool::PoolConnection;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool};
use std::str::FromStr;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::config::DatabaseConfig;
use crate::constants::database::POOL_OBJECT;
use crate::errors::{DataAccessError, InventoryError, LifecycleError, SchemaBootstrapError};

/// Schema-level contract shared by every table DAO.
#[async_trait]
pub trait InventoryDao: Send + Sync {
    /// DAO name used in log lines
    fn name(&self) -> &'static str;

    fn table_name(&self) -> &'static str;

    fn pool(&self) -> &SqlitePool;

    async fn check_if_table_exists(&self) -> Result<bool, sqlx::Error> {
        bootstrap::object_exists(self.pool(), SchemaObjectKind::Table, self.table_name()).await
    }

    /// Issues the DDL for this table. Only called when the table is absent.
    async fn create_table(&self) -> Result<(), sqlx::Error>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Uninitialized,
    Configured,
    Ready,
}

/// A pooled connection for multi-statement work. Returned to the pool on drop.
pub type Handle = PoolConnection<Sqlite>;

static INSTANCE: OnceLock<InventoryDaoManager> = OnceLock::new();

pub struct InventoryDaoManager {
    configuration: OnceLock<DatabaseConfig>,
    // Set only after bootstrap succeeds
    pool: OnceLock<SqlitePool>,
    bootstrap: OnceLock<BootstrapReport>,
}

impl Default for InventoryDaoManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InventoryDaoManager {
    pub fn new() -> Self {
        Self {
            configuration: OnceLock::new(),
            pool: OnceLock::new(),
            bootstrap: OnceLock::new(),
        }
    }

    /// Process-wide manager for callers that cannot have one injected.
    ///
    /// `setup` must still be called exactly once, before any request handling
    /// starts.
    pub fn instance() -> &'static InventoryDaoManager {
        INSTANCE.get_or_init(InventoryDaoManager::new)
    }

    /// Builds a manager that is ready on return: setup and schema bootstrap in one step.
    pub async fn open(config: DatabaseConfig) -> Result<Self, InventoryError> {
        let manager = Self::new();
        manager.setup(config)?;
        manager.initialize().await?;
        Ok(manager)
    }

    /// Stores the database settings. Succeeds once; later calls fail and keep the first settings.
    pub fn setup(&self, config: DatabaseConfig) -> Result<(), LifecycleError> {
        if self.configuration.set(config).is_err() {
            error!("InventoryDaoManager setup called more than once");
            return Err(LifecycleError::SetupAlreadyCalled);
        }
        debug!("InventoryDaoManager configured");
        Ok(())
    }

    /// What the initialize call that made this manager ready found and created
    pub fn bootstrap_report(&self) -> Option<&BootstrapReport> {
        self.bootstrap.get()
    }

    pub fn configuration(&self) -> Option<&DatabaseConfig> {
        self.configuration.get()
    }

    pub fn state(&self) -> LifecycleState {
        if self.pool.get().is_some() {
            LifecycleState::Ready
        } else if self.configuration.get().is_some() {
            LifecycleState::Configured
        } else {
            LifecycleState::Uninitialized
        }
    }

    /// Connects and bootstraps the schema.
    ///
    /// The pool becomes visible to DAO accessors only after every table and the
    /// view were checked or created, so a failure here leaves the manager not ready.
    pub async fn initialize(&self) -> Result<BootstrapReport, InventoryError> {
        let config = self.configuration.get().ok_or(LifecycleError::NotSetup)?;

        info!("=== Starting inventory schema bootstrap ===");
        let pool = match connect(config).await {
            Ok(pool) => pool,
            Err(e) => {
                error!("FAILED to connect to database: {}", e);
                return Err(SchemaBootstrapError::new(POOL_OBJECT, e).into());
            }
        };

        let report = match bootstrap_schema(&pool).await {
            Ok(report) => report,
            Err(e) => {
                error!("CRITICAL: schema bootstrap failed: {}", e);
                pool.close().await;
                return Err(e.into());
            }
        };

        match self.pool.set(pool) {
            Ok(()) => {
                let _ = self.bootstrap.set(report.clone());
            }
            Err(duplicate) => {
                warn!("InventoryDaoManager already initialized, keeping the existing pool");
                duplicate.close().await;
            }
        }

        info!(
            "=== Schema bootstrap completed: {} objects created, {} already present ===",
            report.ddl_count(),
            report.steps.len() - report.ddl_count()
        );
        Ok(report)
    }

    fn ready_pool(&self) -> Result<&SqlitePool, LifecycleError> {
        self.pool.get().ok_or(LifecycleError::NotInitialized)
    }

    pub fn service_types_dao(&self) -> Result<ServiceTypesDao, LifecycleError> {
        Ok(ServiceTypesDao::new(self.ready_pool()?.clone()))
    }

    pub fn services_dao(&self) -> Result<ServicesDao, LifecycleError> {
        Ok(ServicesDao::new(self.ready_pool()?.clone()))
    }

    pub fn service_components_dao(&self) -> Result<ServiceComponentsDao, LifecycleError> {
        Ok(ServiceComponentsDao::new(self.ready_pool()?.clone()))
    }

    pub fn services_components_maps_dao(&self) -> Result<ServicesComponentsMapsDao, LifecycleError> {
        Ok(ServicesComponentsMapsDao::new(self.ready_pool()?.clone()))
    }

    pub fn service_transactions_dao(&self) -> Result<ServiceTransactionsDao, LifecycleError> {
        Ok(ServiceTransactionsDao::new(self.ready_pool()?.clone()))
    }

    /// A raw pooled connection. The caller owns it until it is dropped.
    pub async fn handle(&self) -> Result<Handle, InventoryError> {
        let pool = self.ready_pool()?;
        let conn = pool.acquire().await.map_err(|e| {
            let err = DataAccessError::from(e);
            if err.is_pool_timeout() {
                warn!("Timed out waiting for a pooled connection, all handles are in use");
            }
            err
        })?;
        Ok(conn)
    }

    /// Closes the pool. Outstanding handles finish first.
    pub async fn close(&self) {
        if let Some(pool) = self.pool.get() {
            info!("Closing inventory connection pool");
            pool.close().await;
        }
    }
}

async fn connect(config: &DatabaseConfig) -> Result<SqlitePool, sqlx::Error> {
    info!("Connecting to database with URL: {}", config.url);

    let options = SqliteConnectOptions::from_str(&config.url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(config.acquire_timeout_seconds));

    // Ensure parent directory exists for file-backed databases
    if let Some(parent) = options.get_filename().parent() {
        if !parent.as_os_str().is_empty() {
            debug!("Ensuring parent directory exists: {:?}", parent);
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_seconds))
        .connect_with(options)
        .await?;

    info!(
        "Successfully connected to SQLite database (max {} connections)",
        config.max_connections
    );
    Ok(pool)
}
