//! Service to component mapping operations.

use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::debug;

use super::records::ServiceComponentMap;
use super::InventoryDao;
use crate::constants::schema::SERVICES_COMPONENTS_MAPS_TABLE;
use crate::errors::DataAccessError;

#[derive(Clone)]
pub struct ServicesComponentsMapsDao {
    pool: SqlitePool,
}

impl ServicesComponentsMapsDao {
    pub(crate) fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, mapping: &ServiceComponentMap) -> Result<(), DataAccessError> {
        debug!(
            "Mapping component {} to service {}",
            mapping.component_id, mapping.service_id
        );

        sqlx::query(
            "INSERT INTO dcae_services_components_maps (service_id, component_id, created) VALUES (?, ?, ?)",
        )
        .bind(&mapping.service_id)
        .bind(&mapping.component_id)
        .bind(mapping.created)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn delete(&self, service_id: &str, component_id: &str) -> Result<bool, DataAccessError> {
        let result = sqlx::query(
            "DELETE FROM dcae_services_components_maps WHERE service_id = ? AND component_id = ?",
        )
        .bind(service_id)
        .bind(component_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_all_for_service(&self, service_id: &str) -> Result<u64, DataAccessError> {
        let result = sqlx::query("DELETE FROM dcae_services_components_maps WHERE service_id = ?")
            .bind(service_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn list_component_ids(&self, service_id: &str) -> Result<Vec<String>, DataAccessError> {
        let ids: Vec<String> = sqlx::query_scalar(
            "SELECT component_id FROM dcae_services_components_maps WHERE service_id = ? ORDER BY created, component_id",
        )
        .bind(service_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }
}

#[async_trait]
impl InventoryDao for ServicesComponentsMapsDao {
    fn name(&self) -> &'static str {
        "ServicesComponentsMapsDao"
    }

    fn table_name(&self) -> &'static str {
        SERVICES_COMPONENTS_MAPS_TABLE
    }

    fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn create_table(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            CREATE TABLE dcae_services_components_maps (
                service_id TEXT NOT NULL REFERENCES dcae_services(service_id),
                component_id TEXT NOT NULL REFERENCES dcae_service_components(component_id),
                created DATETIME NOT NULL,
                PRIMARY KEY (service_id, component_id)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
