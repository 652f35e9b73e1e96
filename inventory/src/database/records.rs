//! Database record types (entities).
//!
//! This module contains all the record structs used by the DAO layer, plus
//! the row-mapping helpers shared by the DAOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::fmt;
use std::str::FromStr;

use crate::errors::DataAccessError;

// ============================================================================
// Service types (versioned, append-only)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceType {
    pub type_id: String,
    pub type_version: i64,
    pub type_name: String,
    pub owner: String,
    pub blueprint_template: String,
    pub vnf_types: Vec<String>,         // JSON array column
    pub service_ids: Vec<String>,       // JSON array column
    pub service_locations: Vec<String>, // JSON array column
    pub asdc_service_id: Option<String>,
    pub asdc_resource_id: Option<String>,
    pub asdc_service_url: Option<String>,
    pub created: DateTime<Utc>,
    pub deactivated: Option<DateTime<Utc>>,
}

impl ServiceType {
    pub fn is_active(&self) -> bool {
        self.deactivated.is_none()
    }
}

// ============================================================================
// Service instances and components (mutable status)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub service_id: String,
    pub type_id: String,
    pub vnf_id: String,
    pub vnf_type: String,
    pub vnf_location: String,
    pub deployment_ref: Option<String>,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
    pub deactivated: Option<DateTime<Utc>>,
}

impl Service {
    pub fn is_active(&self) -> bool {
        self.deactivated.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceComponent {
    pub component_id: String,
    pub component_type: String,
    pub component_source: String,
    pub shareable: bool,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
    pub deactivated: Option<DateTime<Utc>>,
}

impl ServiceComponent {
    pub fn is_active(&self) -> bool {
        self.deactivated.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceComponentMap {
    pub service_id: String,
    pub component_id: String,
    pub created: DateTime<Utc>,
}

// ============================================================================
// Audit rows
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceTransaction {
    pub transaction_id: String,
    pub service_id: String,
    pub operation: TransactionOperation,
    pub component_count: i64,
    pub created: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionOperation {
    Insert,
    Update,
}

impl TransactionOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionOperation::Insert => "insert",
            TransactionOperation::Update => "update",
        }
    }
}

impl FromStr for TransactionOperation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "insert" => Ok(TransactionOperation::Insert),
            "update" => Ok(TransactionOperation::Update),
            other => Err(format!("unknown transaction operation: {}", other)),
        }
    }
}

// ============================================================================
// Lookup helpers
// ============================================================================

/// Optional predicates for listing services. Unset fields do not filter.
#[derive(Debug, Clone, Default)]
pub struct ServiceFilter {
    pub type_id: Option<String>,
    pub vnf_id: Option<String>,
    pub vnf_location: Option<String>,
    /// Matches services whose `vnf_type` is any of these. `Some(vec![])` matches nothing.
    pub vnf_types: Option<Vec<String>>,
    pub include_deactivated: bool,
}

/// Service columns a caller may group counts by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupByProperty {
    Type,
    VnfId,
    VnfType,
    VnfLocation,
}

impl GroupByProperty {
    pub fn column(&self) -> &'static str {
        match self {
            GroupByProperty::Type => "type_id",
            GroupByProperty::VnfId => "vnf_id",
            GroupByProperty::VnfType => "vnf_type",
            GroupByProperty::VnfLocation => "vnf_location",
        }
    }
}

impl fmt::Display for GroupByProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GroupByProperty::Type => "type",
            GroupByProperty::VnfId => "vnfId",
            GroupByProperty::VnfType => "vnfType",
            GroupByProperty::VnfLocation => "vnfLocation",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for GroupByProperty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "type" => Ok(GroupByProperty::Type),
            "vnfId" => Ok(GroupByProperty::VnfId),
            "vnfType" => Ok(GroupByProperty::VnfType),
            "vnfLocation" => Ok(GroupByProperty::VnfLocation),
            other => Err(format!("unsupported group-by property: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupCount {
    pub property_value: String,
    pub count: i64,
}

// ============================================================================
// Row mapping
// ============================================================================

pub(crate) fn encode_list(values: &[String]) -> Result<String, DataAccessError> {
    Ok(serde_json::to_string(values)?)
}

fn decode_list(raw: Option<String>) -> Result<Vec<String>, DataAccessError> {
    match raw {
        Some(text) if !text.is_empty() => Ok(serde_json::from_str(&text)?),
        _ => Ok(Vec::new()),
    }
}

pub(crate) fn service_type_from_row(row: &SqliteRow) -> Result<ServiceType, DataAccessError> {
    Ok(ServiceType {
        type_id: row.try_get("type_id")?,
        type_version: row.try_get("type_version")?,
        type_name: row.try_get("type_name")?,
        owner: row.try_get("owner")?,
        blueprint_template: row.try_get("blueprint_template")?,
        vnf_types: decode_list(row.try_get("vnf_types")?)?,
        service_ids: decode_list(row.try_get("service_ids")?)?,
        service_locations: decode_list(row.try_get("service_locations")?)?,
        asdc_service_id: row.try_get("asdc_service_id")?,
        asdc_resource_id: row.try_get("asdc_resource_id")?,
        asdc_service_url: row.try_get("asdc_service_url")?,
        created: row.try_get("created")?,
        deactivated: row.try_get("deactivated")?,
    })
}

pub(crate) fn service_from_row(row: &SqliteRow) -> Result<Service, DataAccessError> {
    Ok(Service {
        service_id: row.try_get("service_id")?,
        type_id: row.try_get("type_id")?,
        vnf_id: row.try_get("vnf_id")?,
        vnf_type: row.try_get("vnf_type")?,
        vnf_location: row.try_get("vnf_location")?,
        deployment_ref: row.try_get("deployment_ref")?,
        created: row.try_get("created")?,
        modified: row.try_get("modified")?,
        deactivated: row.try_get("deactivated")?,
    })
}

pub(crate) fn component_from_row(row: &SqliteRow) -> Result<ServiceComponent, DataAccessError> {
    Ok(ServiceComponent {
        component_id: row.try_get("component_id")?,
        component_type: row.try_get("component_type")?,
        component_source: row.try_get("component_source")?,
        shareable: row.try_get("shareable")?,
        created: row.try_get("created")?,
        modified: row.try_get("modified")?,
        deactivated: row.try_get("deactivated")?,
    })
}

pub(crate) fn transaction_from_row(row: &SqliteRow) -> Result<ServiceTransaction, DataAccessError> {
    let operation: String = row.try_get("operation")?;
    let operation: TransactionOperation = operation.parse().map_err(|e: String| {
        DataAccessError::Sql(sqlx::Error::ColumnDecode {
            index: "operation".to_string(),
            source: e.into(),
        })
    })?;

    Ok(ServiceTransaction {
        transaction_id: row.try_get("transaction_id")?,
        service_id: row.try_get("service_id")?,
        operation,
        component_count: row.try_get("component_count")?,
        created: row.try_get("created")?,
    })
}
