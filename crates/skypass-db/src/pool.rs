//! # Database Pool Management
//!
//! Connection pool creation and configuration for SQLite.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Database Connection Pool                           │
//! │                                                                         │
//! │  App::start                                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbConfig::new(path) ← Configure pool settings                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database::new(config).await ← pool + schema check + default seed      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────┐   ┌────────────────────┐  │
//! │  │            SqlitePool                    │   │  ChangeNotifier    │  │
//! │  │  ┌─────┐ ┌─────┐ ┌─────┐                │   │  (broadcast)       │  │
//! │  │  │Conn1│ │Conn2│ │Conn3│ ...            │   │                    │  │
//! │  │  └─────┘ └─────┘ └─────┘                │   └─────────┬──────────┘  │
//! │  └─────────────────────────────────────────┘             │             │
//! │       │                                                  │             │
//! │       ▼                                                  ▼             │
//! │  db.entries() / db.tags() / db.categories()  ── share both handles    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## WAL Mode
//! File-backed stores run in WAL mode so live-query re-reads don't block
//! writers.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::journal::Journal;
use crate::live::ChangeNotifier;
use crate::migrations::{self, SchemaState};
use crate::repository::category::CategoryRepository;
use crate::repository::entry::EntryRepository;
use crate::repository::tag::TagRepository;

/// Path value that selects a private in-memory store.
pub const IN_MEMORY_PATH: &str = ":memory:";

// =============================================================================
// Configuration
// =============================================================================

/// Database configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = DbConfig::new("/path/to/skypass.db")
///     .max_connections(4)
///     .min_connections(1);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Path to the SQLite database file, or `:memory:`.
    pub database_path: PathBuf,

    /// Maximum number of connections in the pool.
    /// Default: 4
    pub max_connections: u32,

    /// Minimum number of connections to keep alive.
    /// Default: 1
    pub min_connections: u32,

    /// Connection timeout duration.
    /// Default: 30 seconds
    pub connect_timeout: Duration,

    /// Idle timeout before closing a connection.
    /// Default: 10 minutes
    pub idle_timeout: Duration,

    /// Whether to check the schema version and run migrations on connect.
    /// Default: true
    pub run_migrations: bool,

    /// Whether a freshly created store gets the default categories.
    /// Default: true
    pub seed_defaults: bool,
}

impl DbConfig {
    /// Creates a new database configuration with the given path.
    ///
    /// The file is created if it doesn't exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 4,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            run_migrations: true,
            seed_defaults: true,
        }
    }

    /// Sets the maximum number of connections.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets the minimum number of connections.
    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// Sets the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets whether to run migrations on connect.
    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// Sets whether a fresh store is seeded with the default categories.
    pub fn seed_defaults(mut self, seed: bool) -> Self {
        self.seed_defaults = seed;
        self
    }

    /// Creates an in-memory database configuration (for testing).
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let db = Database::new(DbConfig::in_memory()).await?;
    /// // Isolated store, gone when the pool closes
    /// ```
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(IN_MEMORY_PATH),
            // In-memory requires a single connection. Never acquire a
            // second one while holding a transaction.
            max_connections: 1,
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(60),
            run_migrations: true,
            seed_defaults: true,
        }
    }

    /// True when the config points at an in-memory store.
    pub fn is_in_memory(&self) -> bool {
        self.database_path == Path::new(IN_MEMORY_PATH)
    }
}

// =============================================================================
// Database
// =============================================================================

/// Main database handle providing repository access.
///
/// Cheap to clone: the pool and the change notifier are both shared handles.
///
/// ## Usage
/// ```rust,ignore
/// let db = Database::new(DbConfig::new("./skypass.db")).await?;
///
/// let id = db.entries().insert(&entry).await?;
/// let mut tags = db.tags().live_for_entry(id);
/// ```
#[derive(Debug, Clone)]
pub struct Database {
    /// The SQLite connection pool.
    pool: SqlitePool,

    /// Fan-out of committed writes to live queries.
    notifier: ChangeNotifier,

    /// What schema preparation found on open (`None` if it was skipped).
    schema_state: Option<SchemaState>,
}

impl Database {
    /// Opens the store.
    ///
    /// ## What This Does
    /// 1. Creates the database file if it doesn't exist
    /// 2. Configures SQLite: WAL (file stores), NORMAL synchronous,
    ///    foreign keys on
    /// 3. Creates the connection pool
    /// 4. Checks the schema version and migrates, wiping on mismatch
    /// 5. Seeds the default categories into a fresh store
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(
            path = %config.database_path.display(),
            "Initializing database connection"
        );

        let connect_options = if config.is_in_memory() {
            SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
        } else {
            SqliteConnectOptions::new()
                .filename(&config.database_path)
                .journal_mode(SqliteJournalMode::Wal)
        };

        let connect_options = connect_options
            .synchronous(SqliteSynchronous::Normal)
            // Cross-ref rows cascade away with their entry or tag
            .foreign_keys(true)
            .create_if_missing(true);

        debug!("Connection options configured");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(Some(config.idle_timeout))
            .connect_with(connect_options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        info!(
            max_connections = config.max_connections,
            "Database pool created"
        );

        let mut db = Database {
            pool,
            notifier: ChangeNotifier::default(),
            schema_state: None,
        };

        if config.run_migrations {
            let state = migrations::prepare_schema(&db.pool).await?;
            db.schema_state = Some(state);

            let (total, applied, version) = migrations::migration_status(&db.pool).await?;
            debug!(total, applied, version, "Migration status");

            if state.is_fresh() && config.seed_defaults {
                let seeded = db.categories().insert_defaults().await?;
                info!(seeded, "Default categories seeded");
            }
        }

        Ok(db)
    }

    /// Returns a reference to the connection pool.
    ///
    /// Writes made through the pool directly bypass change notification.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Returns the change notifier shared by every repository.
    pub fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }

    /// What schema preparation found when the store was opened.
    pub fn schema_state(&self) -> Option<SchemaState> {
        self.schema_state
    }

    /// Returns the entry repository.
    pub fn entries(&self) -> EntryRepository {
        EntryRepository::new(self.pool.clone(), self.notifier.clone())
    }

    /// Returns the tag repository.
    pub fn tags(&self) -> TagRepository {
        TagRepository::new(self.pool.clone(), self.notifier.clone())
    }

    /// Returns the category repository.
    pub fn categories(&self) -> CategoryRepository {
        CategoryRepository::new(self.pool.clone(), self.notifier.clone())
    }

    /// Returns the journal (validated, transactional operations).
    pub fn journal(&self) -> Journal {
        Journal::new(self.clone())
    }

    /// Closes the database connection pool.
    ///
    /// After calling close, all repository operations fail.
    pub async fn close(&self) {
        info!("Closing database connection pool");
        self.pool.close().await;
    }

    /// Checks if the database is healthy (can execute queries).
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrations::SCHEMA_VERSION;

    #[tokio::test]
    async fn test_in_memory_database() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        assert!(db.health_check().await);
        assert_eq!(db.schema_state(), Some(SchemaState::Created));
    }

    #[tokio::test]
    async fn test_config_builder() {
        let config = DbConfig::new("/tmp/test.db")
            .max_connections(10)
            .min_connections(2)
            .seed_defaults(false);

        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 2);
        assert!(!config.seed_defaults);
        assert!(!config.is_in_memory());
        assert!(DbConfig::in_memory().is_in_memory());
    }

    #[tokio::test]
    async fn test_fresh_store_has_default_categories() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let names: Vec<String> = db
            .categories()
            .live_all()
            .first()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();

        assert_eq!(
            names,
            vec!["City Tour", "General", "Hiking", "Road Trip", "Vacation"]
        );
    }

    #[tokio::test]
    async fn test_migration_status_reports_unmigrated_store() {
        let db = Database::new(DbConfig::in_memory().run_migrations(false))
            .await
            .unwrap();

        assert!(migrations::migration_status(db.pool()).await.is_err());
    }

    #[tokio::test]
    async fn test_skip_seeding() {
        let db = Database::new(DbConfig::in_memory().seed_defaults(false))
            .await
            .unwrap();

        assert!(db.categories().live_all().first().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reopen_keeps_data_and_does_not_reseed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("journal.db");

        let db = Database::new(DbConfig::new(&path)).await.unwrap();
        db.categories()
            .insert(&skypass_core::TravelCategory::new("Kayaking", "#00AAFF"))
            .await
            .unwrap();
        db.close().await;

        let db = Database::new(DbConfig::new(&path)).await.unwrap();
        assert_eq!(db.schema_state(), Some(SchemaState::Current));

        let categories = db.categories().live_all().first().await.unwrap();
        assert_eq!(categories.len(), 6);
        assert!(db.categories().exists("Kayaking").await.unwrap());
    }

    #[tokio::test]
    async fn test_version_mismatch_recreates_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("journal.db");

        let db = Database::new(DbConfig::new(&path)).await.unwrap();
        db.tags()
            .insert(&skypass_core::TravelTag::new("Alps", "#112233"))
            .await
            .unwrap();
        sqlx::query("PRAGMA user_version = 1")
            .execute(db.pool())
            .await
            .unwrap();
        db.close().await;

        let db = Database::new(DbConfig::new(&path)).await.unwrap();
        assert_eq!(db.schema_state(), Some(SchemaState::Recreated { from: 1 }));
        assert!(db.tags().live_all().first().await.unwrap().is_empty());
        assert_eq!(db.categories().live_all().first().await.unwrap().len(), 5);

        let (total, applied, version) = migrations::migration_status(db.pool()).await.unwrap();
        assert_eq!(total, applied);
        assert_eq!(version, SCHEMA_VERSION);
    }

    #[tokio::test]
    async fn test_unversioned_store_with_tables_is_recreated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("legacy.db");

        let legacy = Database::new(DbConfig::new(&path).run_migrations(false))
            .await
            .unwrap();
        sqlx::query("CREATE TABLE notes (id INTEGER PRIMARY KEY, body TEXT)")
            .execute(legacy.pool())
            .await
            .unwrap();
        legacy.close().await;

        let db = Database::new(DbConfig::new(&path)).await.unwrap();
        assert_eq!(db.schema_state(), Some(SchemaState::Recreated { from: 0 }));

        let notes: Option<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'notes'",
        )
        .fetch_optional(db.pool())
        .await
        .unwrap();
        assert!(notes.is_none());
    }
}
