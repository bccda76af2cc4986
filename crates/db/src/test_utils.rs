//! Test utilities for database operations.
//!
//! Provides helpers for setting up and tearing down test databases:
//! an in-memory `SQLite` database for self-contained tests and a
//! `PostgreSQL` harness for the ignored integration tests.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ConnectOptions, ConnectionTrait, Database, DatabaseBackend,
    DatabaseConnection, DbErr, Set, Statement,
};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use crate::entities::{email_address, user};
use crate::migrations::Migrator;

/// Open a migrated in-memory `SQLite` database.
///
/// The pool holds a single connection so every handle sees the same
/// database; concurrent transactions queue on it.
pub async fn memory_database() -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).min_connections(1).sqlx_logging(false);

    let conn = Database::connect(opt).await?;
    Migrator::up(&conn, None).await?;
    Ok(conn)
}

/// Insert an account.
pub async fn seed_user(
    conn: &DatabaseConnection,
    id: &str,
    is_admin: bool,
) -> Result<user::Model, DbErr> {
    user::ActiveModel {
        id: Set(id.to_string()),
        username: Set(format!("user_{id}")),
        is_admin: Set(is_admin),
        created_at: Set(Utc::now().into()),
    }
    .insert(conn)
    .await
}

/// Insert an email address for an account.
pub async fn seed_email(
    conn: &DatabaseConnection,
    user_id: &str,
    email: &str,
    is_verified: bool,
) -> Result<email_address::Model, DbErr> {
    email_address::ActiveModel {
        id: Set(ulid::Ulid::new().to_string().to_lowercase()),
        user_id: Set(user_id.to_string()),
        email: Set(email.to_string()),
        is_verified: Set(is_verified),
        created_at: Set(Utc::now().into()),
    }
    .insert(conn)
    .await
}

/// Test database configuration.
#[derive(Debug, Clone)]
pub struct TestDbConfig {
    /// Database host.
    pub host: String,
    /// Database port.
    pub port: u16,
    /// Database username.
    pub username: String,
    /// Database password.
    pub password: String,
    /// Database name.
    pub database: String,
}

impl Default for TestDbConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("TEST_DB_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: std::env::var("TEST_DB_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5433),
            username: std::env::var("TEST_DB_USER").unwrap_or_else(|_| "keyhold_test".to_string()),
            password: std::env::var("TEST_DB_PASSWORD")
                .unwrap_or_else(|_| "keyhold_test".to_string()),
            database: std::env::var("TEST_DB_NAME").unwrap_or_else(|_| "keyhold_test".to_string()),
        }
    }
}

impl TestDbConfig {
    /// Get the database URL.
    #[must_use]
    pub fn database_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database
        )
    }
}

/// A connection to the shared `PostgreSQL` test database.
pub struct TestDatabase {
    /// Database connection.
    pub conn: DatabaseConnection,
    /// Database configuration.
    pub config: TestDbConfig,
}

impl TestDatabase {
    /// Connect with the default configuration and run migrations.
    pub async fn new() -> Result<Self, DbErr> {
        Self::with_config(TestDbConfig::default()).await
    }

    /// Connect with a custom configuration and run migrations.
    pub async fn with_config(config: TestDbConfig) -> Result<Self, DbErr> {
        let conn = Database::connect(&config.database_url()).await?;
        Migrator::up(&conn, None).await?;

        info!(database = %config.database, "Connected to test database");

        Ok(Self { conn, config })
    }

    /// Get the database connection.
    #[must_use]
    pub const fn connection(&self) -> &DatabaseConnection {
        &self.conn
    }

    /// Remove all rows, children first.
    pub async fn cleanup(&self) -> Result<(), DbErr> {
        for table in ["gpg_key", "email_address", "user"] {
            self.conn
                .execute(Statement::from_string(
                    DatabaseBackend::Postgres,
                    format!("DELETE FROM \"{table}\""),
                ))
                .await?;
        }

        info!("Cleaned up test database");
        Ok(())
    }
}
