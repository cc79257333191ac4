//! # Schema Management
//!
//! Embedded SQL migrations plus the schema-version check that runs before
//! them.
//!
//! ## Open Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Schema Preparation                                 │
//! │                                                                         │
//! │  Database::new                                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  PRAGMA user_version                                                   │
//! │       │                                                                 │
//! │       ├── 0 and no tables        → Created   (fresh store)             │
//! │       ├── == SCHEMA_VERSION      → Current   (keep everything)         │
//! │       └── anything else          → Recreated (DROP every table)        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  MIGRATOR.run  (001_initial_schema.sql, ...)                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  PRAGMA user_version = SCHEMA_VERSION                                  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Destructive Upgrade
//! A store written by any other schema version is wiped and recreated.
//! Journal data in it is lost; that is the accepted upgrade policy.
//!
//! ## Adding New Migrations
//! 1. Add `NNN_description.sql` under `migrations/`
//! 2. Never edit an applied migration
//! 3. Bump [`SCHEMA_VERSION`] if existing stores must be recreated

use sqlx::migrate::Migrator;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};

use crate::error::DbResult;

/// Version written to `PRAGMA user_version` once the schema is in place.
pub const SCHEMA_VERSION: i64 = 2;

/// Embedded migrations from the crate's `migrations` directory.
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// What schema preparation found on open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaState {
    /// Empty store; schema created from scratch.
    Created,
    /// Store already at [`SCHEMA_VERSION`].
    Current,
    /// Store was at another version and has been wiped.
    Recreated { from: i64 },
}

impl SchemaState {
    /// True when the store starts out empty (defaults must be seeded).
    pub fn is_fresh(&self) -> bool {
        !matches!(self, SchemaState::Current)
    }
}

/// Brings the store to [`SCHEMA_VERSION`].
///
/// Runs on a single connection so the `foreign_keys` toggle used while
/// dropping tables applies to the drops.
pub async fn prepare_schema(pool: &SqlitePool) -> DbResult<SchemaState> {
    let mut conn = pool.acquire().await?;

    let version = user_version(&mut conn).await?;
    let tables = user_tables(&mut conn).await?;

    let state = if version == SCHEMA_VERSION {
        SchemaState::Current
    } else if version == 0 && tables.is_empty() {
        SchemaState::Created
    } else {
        warn!(
            found = version,
            expected = SCHEMA_VERSION,
            tables = tables.len(),
            "Schema version mismatch, recreating store"
        );
        drop_tables(&mut conn, &tables).await?;
        SchemaState::Recreated { from: version }
    };

    debug!(?state, "Running migrations");
    MIGRATOR.run(&mut *conn).await?;

    if state.is_fresh() {
        sqlx::query(&format!("PRAGMA user_version = {SCHEMA_VERSION}"))
            .execute(&mut *conn)
            .await?;
    }

    info!(?state, version = SCHEMA_VERSION, "Schema ready");
    Ok(state)
}

/// Returns `(total_migrations, applied_migrations, user_version)`.
///
/// For diagnostics and the startup log. Fails on a store that has never
/// been migrated.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<(usize, usize, i64)> {
    let total = MIGRATOR.migrations.len();

    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
        .fetch_one(pool)
        .await?;

    let version: i64 = sqlx::query_scalar("PRAGMA user_version")
        .fetch_one(pool)
        .await?;

    Ok((total, applied as usize, version))
}

async fn user_version(conn: &mut SqliteConnection) -> DbResult<i64> {
    let version: i64 = sqlx::query_scalar("PRAGMA user_version")
        .fetch_one(&mut *conn)
        .await?;
    Ok(version)
}

async fn user_tables(conn: &mut SqliteConnection) -> DbResult<Vec<String>> {
    let tables: Vec<String> = sqlx::query_scalar(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%'",
    )
    .fetch_all(&mut *conn)
    .await?;
    Ok(tables)
}

async fn drop_tables(conn: &mut SqliteConnection, tables: &[String]) -> DbResult<()> {
    sqlx::query("PRAGMA foreign_keys = OFF")
        .execute(&mut *conn)
        .await?;

    for table in tables {
        debug!(table = %table, "Dropping table");
        let statement = format!("DROP TABLE IF EXISTS \"{}\"", table.replace('"', "\"\""));
        sqlx::query(&statement).execute(&mut *conn).await?;
    }

    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&mut *conn)
        .await?;
    Ok(())
}
