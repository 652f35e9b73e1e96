//! Lifecycle tests for the DAO manager
//!
//! These tests verify the Uninitialized -> Configured -> Ready transitions,
//! the guards on each step, and raw handle management.

mod common;

use common::fixtures::*;
use inventory::database::ServiceFilter;
use inventory::{DatabaseConfig, InventoryDaoManager, InventoryError, LifecycleError, LifecycleState};
use serial_test::serial;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::Connection;
use std::str::FromStr;

#[test]
fn test_new_manager_is_uninitialized() {
    let manager = InventoryDaoManager::new();
    assert_eq!(manager.state(), LifecycleState::Uninitialized);
    assert!(manager.configuration().is_none());
}

#[test]
fn test_setup_twice_fails_and_keeps_first_config() {
    let db = TestDatabase::new();
    let manager = InventoryDaoManager::new();
    let first = db.config();

    manager.setup(first.clone()).unwrap();
    assert_eq!(manager.state(), LifecycleState::Configured);

    let second = manager.setup(DatabaseConfig::with_url("sqlite:elsewhere.db"));
    assert_eq!(second, Err(LifecycleError::SetupAlreadyCalled));

    let third = manager.setup(first.clone());
    assert_eq!(third, Err(LifecycleError::SetupAlreadyCalled));

    assert_eq!(manager.configuration(), Some(&first));
}

#[test]
fn test_accessors_before_initialize_fail_with_not_initialized() {
    let db = TestDatabase::new();
    let manager = db.configured_manager();

    assert_eq!(
        manager.service_types_dao().err(),
        Some(LifecycleError::NotInitialized)
    );
    assert_eq!(manager.services_dao().err(), Some(LifecycleError::NotInitialized));
    assert_eq!(
        manager.service_components_dao().err(),
        Some(LifecycleError::NotInitialized)
    );
    assert_eq!(
        manager.services_components_maps_dao().err(),
        Some(LifecycleError::NotInitialized)
    );
    assert_eq!(
        manager.service_transactions_dao().err(),
        Some(LifecycleError::NotInitialized)
    );
}

#[test]
fn test_accessors_on_uninitialized_manager_fail() {
    let manager = InventoryDaoManager::new();
    assert_eq!(manager.services_dao().err(), Some(LifecycleError::NotInitialized));
}

#[tokio::test]
async fn test_handle_before_initialize_fails() {
    let manager = InventoryDaoManager::new();
    let result = manager.handle().await;
    assert!(matches!(
        result,
        Err(InventoryError::Lifecycle(LifecycleError::NotInitialized))
    ));
}

#[tokio::test]
async fn test_initialize_without_setup_fails() {
    let manager = InventoryDaoManager::new();
    let result = manager.initialize().await;
    assert!(matches!(
        result,
        Err(InventoryError::Lifecycle(LifecycleError::NotSetup))
    ));
    assert_eq!(manager.state(), LifecycleState::Uninitialized);
}

#[tokio::test]
async fn test_initialize_makes_manager_ready() {
    let db = TestDatabase::new();
    let manager = db.configured_manager();

    let report = manager.initialize().await.unwrap();

    assert_eq!(manager.state(), LifecycleState::Ready);
    assert_eq!(report.steps.len(), 6);
    assert!(db.path().exists());

    let services = manager
        .services_dao()
        .unwrap()
        .list(&ServiceFilter::default())
        .await
        .unwrap();
    assert!(services.is_empty());
}

#[tokio::test]
async fn test_open_returns_ready_manager() {
    let db = TestDatabase::new();
    let manager = db.open().await;

    assert_eq!(manager.state(), LifecycleState::Ready);
    assert_eq!(manager.configuration(), Some(&db.config()));
    // setup stays single-shot after open
    assert_eq!(
        manager.setup(db.config()),
        Err(LifecycleError::SetupAlreadyCalled)
    );
}

#[tokio::test]
async fn test_each_accessor_call_vends_a_new_dao() {
    let db = TestDatabase::new();
    let manager = db.open().await;

    let first = manager.service_types_dao().unwrap();
    let second = manager.service_types_dao().unwrap();

    first.insert(&service_type("t-1", "X", 1)).await.unwrap();
    let found = second.get_by_type_id("t-1").await.unwrap();
    assert_eq!(found.map(|t| t.type_name), Some("X".to_string()));
}

#[tokio::test]
async fn test_failed_bootstrap_leaves_manager_not_ready() {
    let db = TestDatabase::new();
    std::fs::create_dir_all(db.path().parent().unwrap()).unwrap();

    // A table squatting on the view name makes CREATE VIEW fail
    let options = SqliteConnectOptions::from_str(&db.config().url)
        .unwrap()
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .unwrap();
    sqlx::query("CREATE TABLE dcae_service_types_latest (id INTEGER)")
        .execute(&pool)
        .await
        .unwrap();
    pool.close().await;

    let manager = db.configured_manager();
    let result = manager.initialize().await;

    match result {
        Err(InventoryError::SchemaBootstrap(e)) => {
            assert_eq!(e.object, "dcae_service_types_latest");
        }
        other => panic!("expected schema bootstrap error, got {:?}", other.map(|_| ())),
    }
    assert_eq!(manager.state(), LifecycleState::Configured);
    assert_eq!(manager.services_dao().err(), Some(LifecycleError::NotInitialized));
}

#[tokio::test]
async fn test_unreachable_database_is_a_bootstrap_error() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    // A regular file where the database directory should be
    let blocker = temp_dir.path().join("blocker");
    std::fs::write(&blocker, b"not a directory").unwrap();

    let manager = InventoryDaoManager::new();
    manager
        .setup(DatabaseConfig::with_url(format!(
            "sqlite:{}",
            blocker.join("inventory.db").display()
        )))
        .unwrap();

    let result = manager.initialize().await;
    assert!(matches!(result, Err(InventoryError::SchemaBootstrap(_))));
    assert_eq!(manager.state(), LifecycleState::Configured);
}

#[tokio::test]
async fn test_second_initialize_keeps_manager_ready() {
    let db = TestDatabase::new();
    let manager = db.open().await;

    let report = manager.initialize().await.unwrap();

    assert!(report.is_noop());
    assert_eq!(manager.state(), LifecycleState::Ready);
    assert!(manager.services_dao().is_ok());
}

#[tokio::test]
async fn test_handle_supports_multi_statement_transaction() {
    let db = TestDatabase::new();
    let manager = db.open().await;

    {
        let mut handle = manager.handle().await.unwrap();
        let mut tx = handle.begin().await.unwrap();
        sqlx::query(
            "INSERT INTO dcae_service_types (type_id, type_version, type_name, owner, blueprint_template, created) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind("t-tx")
        .bind(1i64)
        .bind("TX")
        .bind("dcae")
        .bind("bp")
        .bind(base_time())
        .execute(&mut *tx)
        .await
        .unwrap();
        tx.rollback().await.unwrap();
    }

    let dao = manager.service_types_dao().unwrap();
    assert!(dao.get_by_type_id("t-tx").await.unwrap().is_none());
}

#[tokio::test]
async fn test_handles_are_released_on_drop() {
    let db = TestDatabase::new();
    let manager = db.open().await;
    let max = db.config().max_connections as usize;

    // Acquiring more handles than the pool holds only works if each one is returned
    for _ in 0..(max * 3) {
        let mut handle = manager.handle().await.unwrap();
        let one: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&mut *handle)
            .await
            .unwrap();
        assert_eq!(one, 1);
    }
}

#[tokio::test]
async fn test_exhausted_pool_reports_timeout() {
    let db = TestDatabase::new();
    let config = DatabaseConfig {
        max_connections: 1,
        acquire_timeout_seconds: 1,
        ..db.config()
    };
    let manager = InventoryDaoManager::open(config).await.unwrap();

    let _held = manager.handle().await.unwrap();
    match manager.handle().await {
        Err(InventoryError::DataAccess(e)) => assert!(e.is_pool_timeout()),
        other => panic!("expected pool timeout, got {:?}", other.map(|_| ())),
    }
}

// The only test in this binary that touches the process-wide instance; its
// lifecycle fields can be set once per process.
#[tokio::test]
#[serial]
async fn test_instance_lifecycle() {
    let manager = InventoryDaoManager::instance();
    assert!(std::ptr::eq(manager, InventoryDaoManager::instance()));

    assert_eq!(manager.state(), LifecycleState::Uninitialized);
    assert_eq!(manager.services_dao().err(), Some(LifecycleError::NotInitialized));

    let db = TestDatabase::new();
    manager.setup(db.config()).unwrap();
    assert_eq!(manager.state(), LifecycleState::Configured);
    assert_eq!(
        manager.service_types_dao().err(),
        Some(LifecycleError::NotInitialized)
    );

    let report = manager.initialize().await.unwrap();
    assert_eq!(report.ddl_count(), 6);
    assert_eq!(manager.state(), LifecycleState::Ready);

    let second = manager.setup(DatabaseConfig::with_url("sqlite:elsewhere.db"));
    assert_eq!(second, Err(LifecycleError::SetupAlreadyCalled));
    assert_eq!(manager.configuration(), Some(&db.config()));

    let types = InventoryDaoManager::instance()
        .service_types_dao()
        .unwrap()
        .list_latest()
        .await
        .unwrap();
    assert!(types.is_empty());

    manager.close().await;
}
