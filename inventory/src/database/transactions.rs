//! Multi-statement service writes and their audit trail.
//!
//! A service together with its components and mappings is written inside one
//! database transaction, and every such write appends one row to
//! `dcae_service_transactions`. Either everything lands or nothing does.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, error, info};
use uuid::Uuid;

use super::records::{
    transaction_from_row, Service, ServiceComponent, ServiceTransaction, TransactionOperation,
};
use super::InventoryDao;
use crate::constants::schema::SERVICE_TRANSACTIONS_TABLE;
use crate::errors::DataAccessError;

#[derive(Clone)]
pub struct ServiceTransactionsDao {
    pool: SqlitePool,
}

impl ServiceTransactionsDao {
    pub(crate) fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Inserts or updates `service`, upserts each component, replaces the
    /// service's component mappings and records the audit row.
    pub async fn upsert_service_with_components(
        &self,
        service: &Service,
        components: &[ServiceComponent],
    ) -> Result<ServiceTransaction, DataAccessError> {
        debug!(
            "Writing service {} with {} components",
            service.service_id,
            components.len()
        );

        let mut tx = self.pool.begin().await?;

        // Must be a write: a read-first transaction cannot wait for the write lock
        let updated = sqlx::query(
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
        .execute(&mut *tx)
        .await?;

        let operation = if updated.rows_affected() > 0 {
            TransactionOperation::Update
        } else {
            sqlx::query(
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
            .execute(&mut *tx)
            .await?;
            TransactionOperation::Insert
        };

        for component in components {
            sqlx::query(
                r#"
                INSERT INTO dcae_service_components (
                    component_id, component_type, component_source, shareable,
                    created, modified, deactivated
                ) VALUES (?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT(component_id) DO UPDATE SET
                    component_type = excluded.component_type,
                    component_source = excluded.component_source,
                    shareable = excluded.shareable,
                    modified = excluded.modified,
                    deactivated = excluded.deactivated
                "#,
            )
            .bind(&component.component_id)
            .bind(&component.component_type)
            .bind(&component.component_source)
            .bind(component.shareable)
            .bind(component.created)
            .bind(component.modified)
            .bind(component.deactivated)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query("DELETE FROM dcae_services_components_maps WHERE service_id = ?")
            .bind(&service.service_id)
            .execute(&mut *tx)
            .await?;

        for component in components {
            sqlx::query(
                "INSERT INTO dcae_services_components_maps (service_id, component_id, created) VALUES (?, ?, ?)",
            )
            .bind(&service.service_id)
            .bind(&component.component_id)
            .bind(service.modified)
            .execute(&mut *tx)
            .await?;
        }

        let record = ServiceTransaction {
            transaction_id: Uuid::new_v4().to_string(),
            service_id: service.service_id.clone(),
            operation,
            component_count: components.len() as i64,
            created: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO dcae_service_transactions (
                transaction_id, service_id, operation, component_count, created
            ) VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.transaction_id)
        .bind(&record.service_id)
        .bind(record.operation.as_str())
        .bind(record.component_count)
        .bind(record.created)
        .execute(&mut *tx)
        .await?;

        if let Err(e) = tx.commit().await {
            error!(
                "Failed to commit service transaction for {}: {}",
                service.service_id, e
            );
            return Err(e.into());
        }

        info!(
            "Service {} {} with {} components (transaction {})",
            record.service_id,
            match record.operation {
                TransactionOperation::Insert => "inserted",
                TransactionOperation::Update => "updated",
            },
            record.component_count,
            record.transaction_id
        );
        Ok(record)
    }

    /// Audit rows for `service_id`, oldest first
    pub async fn list_for_service(&self, service_id: &str) -> Result<Vec<ServiceTransaction>, DataAccessError> {
        let rows = sqlx::query(
            r#"
            SELECT transaction_id, service_id, operation, component_count, created
            FROM dcae_service_transactions
            WHERE service_id = ?
            ORDER BY rowid
            "#,
        )
        .bind(service_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(transaction_from_row).collect()
    }
}

#[async_trait]
impl InventoryDao for ServiceTransactionsDao {
    fn name(&self) -> &'static str {
        "ServiceTransactionsDao"
    }

    fn table_name(&self) -> &'static str {
        SERVICE_TRANSACTIONS_TABLE
    }

    fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn create_table(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            CREATE TABLE dcae_service_transactions (
                transaction_id TEXT PRIMARY KEY NOT NULL,
                service_id TEXT NOT NULL REFERENCES dcae_services(service_id),
                operation TEXT NOT NULL,
                component_count INTEGER NOT NULL,
                created DATETIME NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
