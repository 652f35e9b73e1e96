//! Idempotent schema bootstrap.
//!
//! Tables are checked and created in dependency order, then the latest-version
//! view. A second run against the same database issues no DDL.

use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{error, info};

use super::{
    InventoryDao, ServiceComponentsDao, ServiceTransactionsDao, ServiceTypesDao,
    ServicesComponentsMapsDao, ServicesDao,
};
use crate::constants::schema::SERVICE_TYPES_LATEST_VIEW;
use crate::errors::SchemaBootstrapError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SchemaObjectKind {
    Table,
    View,
}

impl SchemaObjectKind {
    /// Value of `sqlite_master.type`
    fn master_type(&self) -> &'static str {
        match self {
            SchemaObjectKind::Table => "table",
            SchemaObjectKind::View => "view",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BootstrapOutcome {
    Created,
    AlreadyExisted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BootstrapStep {
    pub object: &'static str,
    pub kind: SchemaObjectKind,
    pub outcome: BootstrapOutcome,
}

/// What one bootstrap run did, in the order it did it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BootstrapReport {
    pub steps: Vec<BootstrapStep>,
}

impl BootstrapReport {
    /// Objects created by this run, in creation order
    pub fn created(&self) -> Vec<&'static str> {
        self.steps
            .iter()
            .filter(|s| s.outcome == BootstrapOutcome::Created)
            .map(|s| s.object)
            .collect()
    }

    pub fn ddl_count(&self) -> usize {
        self.created().len()
    }

    /// True when every object already existed
    pub fn is_noop(&self) -> bool {
        self.ddl_count() == 0
    }
}

/// Table DAOs in creation order. Mapping tables reference the tables before them.
pub(crate) fn table_daos(pool: &SqlitePool) -> Vec<Box<dyn InventoryDao>> {
    vec![
        Box::new(ServiceTypesDao::new(pool.clone())),
        Box::new(ServicesDao::new(pool.clone())),
        Box::new(ServiceComponentsDao::new(pool.clone())),
        Box::new(ServicesComponentsMapsDao::new(pool.clone())),
        Box::new(ServiceTransactionsDao::new(pool.clone())),
    ]
}

pub(crate) async fn object_exists(
    pool: &SqlitePool,
    kind: SchemaObjectKind,
    name: &str,
) -> Result<bool, sqlx::Error> {
    let found: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM sqlite_master WHERE type = ? AND name = ?")
            .bind(kind.master_type())
            .bind(name)
            .fetch_one(pool)
            .await?;
    Ok(found > 0)
}

pub async fn bootstrap_schema(pool: &SqlitePool) -> Result<BootstrapReport, SchemaBootstrapError> {
    let mut report = BootstrapReport::default();

    for dao in table_daos(pool) {
        let table = dao.table_name();
        let exists = dao
            .check_if_table_exists()
            .await
            .map_err(|e| SchemaBootstrapError::new(table, e))?;

        let outcome = if exists {
            info!("Sql table exists: {} ({})", table, dao.name());
            BootstrapOutcome::AlreadyExisted
        } else {
            if let Err(e) = dao.create_table().await {
                error!("FAILED to create table {}: {}", table, e);
                return Err(SchemaBootstrapError::new(table, e));
            }
            info!("Sql table created: {} ({})", table, dao.name());
            BootstrapOutcome::Created
        };

        report.steps.push(BootstrapStep {
            object: table,
            kind: SchemaObjectKind::Table,
            outcome,
        });
    }

    let outcome = ensure_latest_view(pool).await.map_err(|e| {
        error!("FAILED to bootstrap view {}: {}", SERVICE_TYPES_LATEST_VIEW, e);
        SchemaBootstrapError::new(SERVICE_TYPES_LATEST_VIEW, e)
    })?;
    report.steps.push(BootstrapStep {
        object: SERVICE_TYPES_LATEST_VIEW,
        kind: SchemaObjectKind::View,
        outcome,
    });

    Ok(report)
}

async fn ensure_latest_view(pool: &SqlitePool) -> Result<BootstrapOutcome, sqlx::Error> {
    if object_exists(pool, SchemaObjectKind::View, SERVICE_TYPES_LATEST_VIEW).await? {
        info!("Sql view exists: {}", SERVICE_TYPES_LATEST_VIEW);
        return Ok(BootstrapOutcome::AlreadyExisted);
    }

    sqlx::query(
        r#"
        CREATE VIEW dcae_service_types_latest AS
        SELECT s.* FROM dcae_service_types s
        JOIN (
            SELECT type_name, MAX(type_version) AS max_version
            FROM dcae_service_types
            GROUP BY type_name
        ) AS f
        ON s.type_name = f.type_name AND s.type_version = f.max_version
        "#,
    )
    .execute(pool)
    .await?;

    info!("Sql view created: {}", SERVICE_TYPES_LATEST_VIEW);
    Ok(BootstrapOutcome::Created)
}
