//! Record builders and common test data

use chrono::{DateTime, Duration, TimeZone, Utc};
use inventory::database::{Service, ServiceComponent, ServiceType};

/// Fixed base timestamp so ordering assertions are stable
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

pub fn at_minute(minute: i64) -> DateTime<Utc> {
    base_time() + Duration::minutes(minute)
}

pub fn service_type(type_id: &str, type_name: &str, type_version: i64) -> ServiceType {
    ServiceType {
        type_id: type_id.to_string(),
        type_version,
        type_name: type_name.to_string(),
        owner: "dcae".to_string(),
        blueprint_template: format!("tosca_definitions_version: {}-v{}", type_name, type_version),
        vnf_types: vec!["vnf-a".to_string()],
        service_ids: Vec::new(),
        service_locations: vec!["loc-1".to_string()],
        asdc_service_id: None,
        asdc_resource_id: None,
        asdc_service_url: None,
        created: at_minute(type_version),
        deactivated: None,
    }
}

pub fn service(service_id: &str, type_id: &str, vnf_type: &str) -> Service {
    Service {
        service_id: service_id.to_string(),
        type_id: type_id.to_string(),
        vnf_id: format!("{}-vnf", service_id),
        vnf_type: vnf_type.to_string(),
        vnf_location: "loc-1".to_string(),
        deployment_ref: None,
        created: base_time(),
        modified: base_time(),
        deactivated: None,
    }
}

pub fn component(component_id: &str, component_type: &str) -> ServiceComponent {
    ServiceComponent {
        component_id: component_id.to_string(),
        component_type: component_type.to_string(),
        component_source: "DCAEController".to_string(),
        shareable: false,
        created: base_time(),
        modified: base_time(),
        deactivated: None,
    }
}

/// Names used by schema and filter tests
pub mod types {
    pub const TYPE_X: &str = "X";
    pub const TYPE_Y: &str = "Y";
}
