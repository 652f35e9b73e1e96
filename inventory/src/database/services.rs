//! Service instance database operations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use tracing::{debug, error};

use super::query::InList;
use super::records::{service_from_row, GroupByProperty, GroupCount, Service, ServiceFilter};
use super::InventoryDao;
use crate::constants::schema::SERVICES_TABLE;
use crate::errors::DataAccessError;

const SELECT_COLUMNS: &str = "service_id, type_id, vnf_id, vnf_type, vnf_location, \
     deployment_ref, created, modified, deactivated";

#[derive(Clone)]
pub struct ServicesDao {
    pool: SqlitePool,
}

impl ServicesDao {
    pub(crate) fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, service: &Service) -> Result<(), DataAccessError> {
        debug!("Storing service: {}", service.service_id);

        match sqlx::query(
            r#"
            INSERT INTO dcae_services (
                service_id, type_id, vnf_id, vnf_type, vnf_location,
                deployment_ref, created, modified, deactivated
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&service.service_id)
        .bind(&service.type_id)
        .bind(&service.vnf_id)
        .bind(&service.vnf_type)
        .bind(&service.vnf_location)
        .bind(&service.deployment_ref)
        .bind(service.created)
        .bind(service.modified)
        .bind(service.deactivated)
        .execute(&self.pool)
        .await
        {
            Ok(_) => Ok(()),
            Err(e) => {
                error!("Failed to store service {}: {}", service.service_id, e);
                Err(e.into())
            }
        }
    }

    pub async fn get_by_service_id(&self, service_id: &str) -> Result<Option<Service>, DataAccessError> {
        let sql = format!("SELECT {} FROM {} WHERE service_id = ?", SELECT_COLUMNS, SERVICES_TABLE);
        let row = sqlx::query(&sql)
            .bind(service_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(service_from_row).transpose()
    }

    /// Overwrites the mutable fields. `created` is left untouched.
    pub async fn update(&self, service: &Service) -> Result<bool, DataAccessError> {
        let result = sqlx::query(
            r#"
            UPDATE dcae_services
            SET type_id = ?, vnf_id = ?, vnf_type = ?, vnf_location = ?,
                deployment_ref = ?, modified = ?, deactivated = ?
            WHERE service_id = ?
            "#,
        )
        .bind(&service.type_id)
        .bind(&service.vnf_id)
        .bind(&service.vnf_type)
        .bind(&service.vnf_location)
        .bind(&service.deployment_ref)
        .bind(service.modified)
        .bind(service.deactivated)
        .bind(&service.service_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn deactivate(&self, service_id: &str, at: DateTime<Utc>) -> Result<bool, DataAccessError> {
        let result = sqlx::query(
            "UPDATE dcae_services SET modified = ?, deactivated = ? WHERE service_id = ? AND deactivated IS NULL",
        )
        .bind(at)
        .bind(at)
        .bind(service_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn list(&self, filter: &ServiceFilter) -> Result<Vec<Service>, DataAccessError> {
        let empty = Vec::new();
        let vnf_types = InList::new("vnf_type", filter.vnf_types.as_ref().unwrap_or(&empty));
        if filter.vnf_types.is_some() && vnf_types.is_empty() {
            debug!("Empty vnf type filter, skipping query");
            return Ok(Vec::new());
        }

        let mut builder =
            QueryBuilder::<Sqlite>::new(format!("SELECT {} FROM {} WHERE 1 = 1", SELECT_COLUMNS, SERVICES_TABLE));
        if !filter.include_deactivated {
            builder.push(" AND deactivated IS NULL");
        }
        if let Some(type_id) = &filter.type_id {
            builder.push(" AND type_id = ");
            builder.push_bind(type_id.clone());
        }
        if let Some(vnf_id) = &filter.vnf_id {
            builder.push(" AND vnf_id = ");
            builder.push_bind(vnf_id.clone());
        }
        if let Some(vnf_location) = &filter.vnf_location {
            builder.push(" AND vnf_location = ");
            builder.push_bind(vnf_location.clone());
        }
        if filter.vnf_types.is_some() {
            builder.push(" AND ");
            vnf_types.push_to(&mut builder)?;
        }
        builder.push(" ORDER BY created, service_id");

        let rows = builder.build().fetch_all(&self.pool).await?;
        debug!("Service list matched {} rows", rows.len());

        rows.iter().map(service_from_row).collect()
    }

    /// Active services whose vnf type is any of `vnf_types`
    pub async fn list_by_vnf_types(&self, vnf_types: &[String]) -> Result<Vec<Service>, DataAccessError> {
        self.list(&ServiceFilter {
            vnf_types: Some(vnf_types.to_vec()),
            ..ServiceFilter::default()
        })
        .await
    }

    /// Active services still referring to `type_id`
    pub async fn count_by_type(&self, type_id: &str) -> Result<i64, DataAccessError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM dcae_services WHERE type_id = ? AND deactivated IS NULL",
        )
        .bind(type_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Active service counts per distinct value of `property`
    pub async fn count_grouped_by(&self, property: GroupByProperty) -> Result<Vec<GroupCount>, DataAccessError> {
        let column = property.column();
        let sql = format!(
            "SELECT {col} AS property_value, COUNT(*) AS count FROM {table} \
             WHERE deactivated IS NULL GROUP BY {col} ORDER BY {col}",
            col = column,
            table = SERVICES_TABLE
        );
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        let mut counts = Vec::with_capacity(rows.len());
        for row in rows {
            counts.push(GroupCount {
                property_value: row.try_get("property_value")?,
                count: row.try_get("count")?,
            });
        }
        Ok(counts)
    }
}

#[async_trait]
impl InventoryDao for ServicesDao {
    fn name(&self) -> &'static str {
        "ServicesDao"
    }

    fn table_name(&self) -> &'static str {
        SERVICES_TABLE
    }

    fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn create_table(&self) -> Result<(), sqlx::Error> {
        // Table and index commit together or not at all
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            CREATE TABLE dcae_services (
                service_id TEXT PRIMARY KEY NOT NULL,
                type_id TEXT NOT NULL REFERENCES dcae_service_types(type_id),
                vnf_id TEXT NOT NULL,
                vnf_type TEXT NOT NULL,
                vnf_location TEXT NOT NULL,
                deployment_ref TEXT,
                created DATETIME NOT NULL,
                modified DATETIME NOT NULL,
                deactivated DATETIME
            )
            "#,
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query("CREATE INDEX idx_dcae_services_type ON dcae_services(type_id)")
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}
