//! Database integration tests.
//!
//! These tests require a running `PostgreSQL` instance.
//! Run with: `cargo test --test db_integration -- --ignored`
//!
//! Environment variables:
//!   `TEST_DB_HOST` (default: localhost)
//!   `TEST_DB_PORT` (default: 5433)
//!   `TEST_DB_USER` (default: `keyhold_test`)
//!   `TEST_DB_PASSWORD` (default: `keyhold_test`)
//!   `TEST_DB_NAME` (default: `keyhold_test`)

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use keyhold_common::AppError;
use keyhold_db::KeyRecord;
use keyhold_db::entities::GpgKey;
use keyhold_db::repositories::GpgKeyRepository;
use keyhold_db::test_utils::{TestDatabase, TestDbConfig, seed_user};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, EntityTrait, TransactionTrait};

/// A pool that can run several transactions at once.
async fn pooled(config: &TestDbConfig) -> DatabaseConnection {
    let mut opt = ConnectOptions::new(config.database_url());
    opt.max_connections(8).min_connections(2).sqlx_logging(false);
    Database::connect(opt).await.unwrap()
}

fn record(id: &str, key_id: &str) -> KeyRecord {
    KeyRecord {
        id: id.to_string(),
        owner_id: "pg-owner".to_string(),
        key_id: key_id.to_string(),
        primary_key_id: None,
        content: "xsBNBF".to_string(),
        emails: vec!["pg@example.com".to_string()],
        created_at: Utc.timestamp_opt(1_500_000_000, 0).unwrap(),
        expires_at: None,
        added_at: Utc::now(),
        can_sign: true,
        can_encrypt_comms: false,
        can_encrypt_storage: false,
        can_certify: true,
        subkeys: Vec::new(),
    }
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_database_connection() {
    let config = TestDbConfig::default();
    let result = TestDatabase::with_config(config).await;
    assert!(result.is_ok(), "Failed to connect: {:?}", result.err());
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_unique_key_id_on_postgres() {
    let config = TestDbConfig::default();
    let db = TestDatabase::with_config(config.clone())
        .await
        .expect("Failed to connect");
    db.cleanup().await.unwrap();
    seed_user(db.connection(), "pg-owner", false).await.unwrap();

    let conn = sea_orm::Database::connect(&config.database_url())
        .await
        .unwrap();
    let repo = GpgKeyRepository::new(Arc::new(conn));
    repo.insert_hierarchy(&record("pg1", "1111111111111111"), &[])
        .await
        .unwrap();

    let err = repo
        .insert_hierarchy(&record("pg2", "1111111111111111"), &[])
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::KeyIdConflict(_)));

    db.cleanup().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "requires running PostgreSQL instance"]
async fn test_parallel_inserts_one_winner_on_postgres() {
    let config = TestDbConfig::default();
    let db = TestDatabase::with_config(config.clone())
        .await
        .expect("Failed to connect");
    db.cleanup().await.unwrap();
    seed_user(db.connection(), "pg-owner", false).await.unwrap();

    let repo = GpgKeyRepository::new(Arc::new(pooled(&config).await));
    let tasks: Vec<_> = (0..8)
        .map(|i| {
            let repo = repo.clone();
            tokio::spawn(async move {
                repo.insert_hierarchy(&record(&format!("pg-race-{i}"), "2222222222222222"), &[])
                    .await
            })
        })
        .collect();

    let results: Vec<_> = futures::future::join_all(tasks)
        .await
        .into_iter()
        .map(Result::unwrap)
        .collect();

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(
        results
            .iter()
            .filter(|r| r.is_err())
            .all(|r| matches!(r, Err(AppError::KeyIdConflict(id)) if id == "2222222222222222"))
    );

    db.cleanup().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
#[ignore = "requires running PostgreSQL instance"]
async fn test_uncommitted_writer_surfaces_as_conflict_on_postgres() {
    let config = TestDbConfig::default();
    let db = TestDatabase::with_config(config.clone())
        .await
        .expect("Failed to connect");
    db.cleanup().await.unwrap();
    seed_user(db.connection(), "pg-owner", false).await.unwrap();

    let conn = Arc::new(pooled(&config).await);
    let repo = GpgKeyRepository::new(Arc::clone(&conn));

    // Another writer holds the key ID in an open transaction, so the
    // existence check below cannot see it and the unique index decides.
    let writer = conn.begin().await.unwrap();
    GpgKey::insert(record("pg-held", "3333333333333333").to_active_model().unwrap())
        .exec(&writer)
        .await
        .unwrap();

    let pending = tokio::spawn({
        let repo = repo.clone();
        async move {
            repo.insert_hierarchy(&record("pg-late", "3333333333333333"), &[])
                .await
        }
    });
    tokio::time::sleep(Duration::from_millis(300)).await;
    writer.commit().await.unwrap();

    let err = pending.await.unwrap().unwrap_err();
    assert!(matches!(err, AppError::KeyIdConflict(id) if id == "3333333333333333"));
    assert!(repo.find_by_id("pg-late").await.unwrap().is_none());
    assert!(repo.find_by_id("pg-held").await.unwrap().is_some());

    db.cleanup().await.unwrap();
}

#[test]
fn test_config_from_env() {
    let config = TestDbConfig::default();
    assert!(!config.host.is_empty());
    assert!(config.port > 0);
    assert!(!config.username.is_empty());
    assert!(!config.database.is_empty());
}

#[test]
fn test_database_url_format() {
    let config = TestDbConfig {
        host: "testhost".to_string(),
        port: 5432,
        username: "testuser".to_string(),
        password: "testpass".to_string(),
        database: "testdb".to_string(),
    };

    let url = config.database_url();
    assert!(url.starts_with("postgres://"));
    assert!(url.contains("testhost"));
    assert!(url.contains("5432"));
    assert!(url.contains("testuser"));
    assert!(url.contains("testdb"));
}
