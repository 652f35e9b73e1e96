//! Error types for the inventory DAO layer
//!
//! Three kinds of failure reach callers:
//! - lifecycle misuse of the DAO manager (programmer errors)
//! - schema bootstrap failures at startup
//! - data access failures during a DAO call
//!
//! None of them are retried here.

use thiserror::Error;

/// Main error type for the inventory core
#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("lifecycle error: {0}")]
    Lifecycle(#[from] LifecycleError),

    #[error(transparent)]
    SchemaBootstrap(#[from] SchemaBootstrapError),

    #[error("data access error: {0}")]
    DataAccess(#[from] DataAccessError),
}

/// Misuse of the two-phase manager lifecycle
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleError {
    /// `setup` was already called on this manager
    #[error("InventoryDaoManager setup can only be called once")]
    SetupAlreadyCalled,

    /// `initialize` was called before `setup`
    #[error("InventoryDaoManager has not been set up")]
    NotSetup,

    /// A DAO or handle was requested before `initialize` completed
    #[error("InventoryDaoManager has not been initialized")]
    NotInitialized,
}

/// Failure while checking or creating a schema object at startup
#[derive(Debug, Error)]
#[error("schema bootstrap failed for {object}: {source}")]
pub struct SchemaBootstrapError {
    pub object: String,
    #[source]
    pub source: sqlx::Error,
}

impl SchemaBootstrapError {
    pub fn new(object: impl Into<String>, source: sqlx::Error) -> Self {
        Self {
            object: object.into(),
            source,
        }
    }
}

/// Failure during a single DAO call
#[derive(Debug, Error)]
pub enum DataAccessError {
    /// Pool exhaustion, connection loss or statement failure
    #[error("sql error: {0}")]
    Sql(#[from] sqlx::Error),

    /// A list column could not be encoded or decoded
    #[error("column encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

impl DataAccessError {
    /// True when the pool could not hand out a connection in time
    pub fn is_pool_timeout(&self) -> bool {
        matches!(self, DataAccessError::Sql(sqlx::Error::PoolTimedOut))
    }
}
