//! Service component database operations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, error};

use super::records::{component_from_row, ServiceComponent};
use super::InventoryDao;
use crate::constants::schema::SERVICE_COMPONENTS_TABLE;
use crate::errors::DataAccessError;

#[derive(Clone)]
pub struct ServiceComponentsDao {
    pool: SqlitePool,
}

impl ServiceComponentsDao {
    pub(crate) fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, component: &ServiceComponent) -> Result<(), DataAccessError> {
        debug!("Storing service component: {}", component.component_id);

        match sqlx::query(
            r#"
            INSERT INTO dcae_service_components (
                component_id, component_type, component_source, shareable,
                created, modified, deactivated
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&component.component_id)
        .bind(&component.component_type)
        .bind(&component.component_source)
        .bind(component.shareable)
        .bind(component.created)
        .bind(component.modified)
        .bind(component.deactivated)
        .execute(&self.pool)
        .await
        {
            Ok(_) => Ok(()),
            Err(e) => {
                error!(
                    "Failed to store service component {}: {}",
                    component.component_id, e
                );
                Err(e.into())
            }
        }
    }

    pub async fn get_by_component_id(
        &self,
        component_id: &str,
    ) -> Result<Option<ServiceComponent>, DataAccessError> {
        let row = sqlx::query(
            r#"
            SELECT component_id, component_type, component_source, shareable,
                   created, modified, deactivated
            FROM dcae_service_components
            WHERE component_id = ?
            "#,
        )
        .bind(component_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(component_from_row).transpose()
    }

    pub async fn update(&self, component: &ServiceComponent) -> Result<bool, DataAccessError> {
        let result = sqlx::query(
            r#"
            UPDATE dcae_service_components
            SET component_type = ?, component_source = ?, shareable = ?,
                modified = ?, deactivated = ?
            WHERE component_id = ?
            "#,
        )
        .bind(&component.component_type)
        .bind(&component.component_source)
        .bind(component.shareable)
        .bind(component.modified)
        .bind(component.deactivated)
        .bind(&component.component_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn deactivate(&self, component_id: &str, at: DateTime<Utc>) -> Result<bool, DataAccessError> {
        let result = sqlx::query(
            r#"
            UPDATE dcae_service_components
            SET modified = ?, deactivated = ?
            WHERE component_id = ? AND deactivated IS NULL
            "#,
        )
        .bind(at)
        .bind(at)
        .bind(component_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Components mapped to `service_id`, in mapping order
    pub async fn list_for_service(&self, service_id: &str) -> Result<Vec<ServiceComponent>, DataAccessError> {
        let rows = sqlx::query(
            r#"
            SELECT c.component_id, c.component_type, c.component_source, c.shareable,
                   c.created, c.modified, c.deactivated
            FROM dcae_service_components c
            JOIN dcae_services_components_maps m ON m.component_id = c.component_id
            WHERE m.service_id = ?
            ORDER BY m.created, c.component_id
            "#,
        )
        .bind(service_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(component_from_row).collect()
    }
}

#[async_trait]
impl InventoryDao for ServiceComponentsDao {
    fn name(&self) -> &'static str {
        "ServiceComponentsDao"
    }

    fn table_name(&self) -> &'static str {
        SERVICE_COMPONENTS_TABLE
    }

    fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn create_table(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            CREATE TABLE dcae_service_components (
                component_id TEXT PRIMARY KEY NOT NULL,
                component_type TEXT NOT NULL,
                component_source TEXT NOT NULL,
                shareable BOOLEAN NOT NULL DEFAULT 0,
                created DATETIME NOT NULL,
                modified DATETIME NOT NULL,
                deactivated DATETIME
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
