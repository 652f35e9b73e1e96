//! Service type database operations.
//!
//! Service types are versioned and append-only. A new version is a new row,
//! and the `dcae_service_types_latest` view exposes the highest version per
//! type name.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::{debug, error};

use super::query::InList;
use super::records::{encode_list, service_type_from_row, ServiceType};
use super::InventoryDao;
use crate::constants::schema::{SERVICE_TYPES_LATEST_VIEW, SERVICE_TYPES_TABLE};
use crate::errors::DataAccessError;

const SELECT_COLUMNS: &str = "type_id, type_version, type_name, owner, blueprint_template, \
     vnf_types, service_ids, service_locations, asdc_service_id, asdc_resource_id, \
     asdc_service_url, created, deactivated";

#[derive(Clone)]
pub struct ServiceTypesDao {
    pool: SqlitePool,
}

impl ServiceTypesDao {
    pub(crate) fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, service_type: &ServiceType) -> Result<(), DataAccessError> {
        debug!(
            "Storing service type: {} ({} v{})",
            service_type.type_id, service_type.type_name, service_type.type_version
        );

        match sqlx::query(
            r#"
            INSERT INTO dcae_service_types (
                type_id, type_version, type_name, owner, blueprint_template,
                vnf_types, service_ids, service_locations, asdc_service_id,
                asdc_resource_id, asdc_service_url, created, deactivated
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&service_type.type_id)
        .bind(service_type.type_version)
        .bind(&service_type.type_name)
        .bind(&service_type.owner)
        .bind(&service_type.blueprint_template)
        .bind(encode_list(&service_type.vnf_types)?)
        .bind(encode_list(&service_type.service_ids)?)
        .bind(encode_list(&service_type.service_locations)?)
        .bind(&service_type.asdc_service_id)
        .bind(&service_type.asdc_resource_id)
        .bind(&service_type.asdc_service_url)
        .bind(service_type.created)
        .bind(service_type.deactivated)
        .execute(&self.pool)
        .await
        {
            Ok(_) => Ok(()),
            Err(e) => {
                error!(
                    "Failed to store service type {}: {}",
                    service_type.type_id, e
                );
                Err(e.into())
            }
        }
    }

    pub async fn get_by_type_id(&self, type_id: &str) -> Result<Option<ServiceType>, DataAccessError> {
        let sql = format!("SELECT {} FROM {} WHERE type_id = ?", SELECT_COLUMNS, SERVICE_TYPES_TABLE);
        let row = sqlx::query(&sql)
            .bind(type_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(service_type_from_row).transpose()
    }

    /// Highest version of `type_name`, read through the latest view
    pub async fn get_latest_by_name(&self, type_name: &str) -> Result<Option<ServiceType>, DataAccessError> {
        let sql = format!(
            "SELECT {} FROM {} WHERE type_name = ?",
            SELECT_COLUMNS, SERVICE_TYPES_LATEST_VIEW
        );
        let row = sqlx::query(&sql)
            .bind(type_name)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(service_type_from_row).transpose()
    }

    pub async fn list_latest(&self) -> Result<Vec<ServiceType>, DataAccessError> {
        let sql = format!(
            "SELECT {} FROM {} ORDER BY type_name",
            SELECT_COLUMNS, SERVICE_TYPES_LATEST_VIEW
        );
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        rows.iter().map(service_type_from_row).collect()
    }

    /// Latest version of each name in `type_names`. An empty list returns no rows
    /// without a round trip.
    pub async fn list_latest_by_names(&self, type_names: &[String]) -> Result<Vec<ServiceType>, DataAccessError> {
        let names = InList::new("type_name", type_names);
        if names.is_empty() {
            debug!("Empty type name filter, skipping query");
            return Ok(Vec::new());
        }

        let mut builder = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {} FROM {} WHERE ",
            SELECT_COLUMNS, SERVICE_TYPES_LATEST_VIEW
        ));
        names.push_to(&mut builder)?;
        builder.push(" ORDER BY type_name");

        let rows = builder.build().fetch_all(&self.pool).await?;
        debug!("{} latest service types for {} names", rows.len(), names.len());

        rows.iter().map(service_type_from_row).collect()
    }

    /// Every stored version of `type_name`, newest first
    pub async fn list_versions(&self, type_name: &str) -> Result<Vec<ServiceType>, DataAccessError> {
        let sql = format!(
            "SELECT {} FROM {} WHERE type_name = ? ORDER BY type_version DESC",
            SELECT_COLUMNS, SERVICE_TYPES_TABLE
        );
        let rows = sqlx::query(&sql)
            .bind(type_name)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(service_type_from_row).collect()
    }

    /// Marks a version deactivated. Returns false when no active row matched.
    pub async fn deactivate(&self, type_id: &str, at: DateTime<Utc>) -> Result<bool, DataAccessError> {
        let result = sqlx::query(
            "UPDATE dcae_service_types SET deactivated = ? WHERE type_id = ? AND deactivated IS NULL",
        )
        .bind(at)
        .bind(type_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl InventoryDao for ServiceTypesDao {
    fn name(&self) -> &'static str {
        "ServiceTypesDao"
    }

    fn table_name(&self) -> &'static str {
        SERVICE_TYPES_TABLE
    }

    fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn create_table(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            CREATE TABLE dcae_service_types (
                type_id TEXT PRIMARY KEY NOT NULL,
                type_version INTEGER NOT NULL,
                type_name TEXT NOT NULL,
                owner TEXT NOT NULL,
                blueprint_template TEXT NOT NULL,
                vnf_types TEXT,
                service_ids TEXT,
                service_locations TEXT,
                asdc_service_id TEXT,
                asdc_resource_id TEXT,
                asdc_service_url TEXT,
                created DATETIME NOT NULL,
                deactivated DATETIME,
                UNIQUE (type_name, type_version)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
