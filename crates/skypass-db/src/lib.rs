//! # skypass-db: Database Layer for Skypass
//!
//! Local storage for the travel journal: SQLite through sqlx, with live
//! queries that re-deliver their results whenever the underlying rows change.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Skypass Data Flow                                │
//! │                                                                         │
//! │  State holder (skypass-app)                                            │
//! │       │  save / delete / create            ▲ LiveQuery results         │
//! │       ▼                                    │                            │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     skypass-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Journal     │───►│  Repositories │───►│   Database   │  │   │
//! │  │   │ (journal.rs)  │    │ entry/tag/    │    │  (pool.rs)   │  │   │
//! │  │   │ transactions  │    │ category      │    │  SqlitePool  │  │   │
//! │  │   └───────────────┘    └───────┬───────┘    └──────────────┘  │   │
//! │  │                                │ notify after commit           │   │
//! │  │                                ▼                               │   │
//! │  │                        ChangeNotifier ──► LiveQuery (live.rs)  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │   SQLite database   <data dir>/skypass.db                      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded migrations and the destructive schema upgrade
//! - [`live`] - Change notification and live queries
//! - [`repository`] - Entry, tag and category repositories
//! - [`journal`] - Validated, transactional operations over the repositories
//! - [`error`] - Database error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use skypass_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/skypass.db")).await?;
//! let journal = db.journal();
//!
//! let id = journal.save_entry_with_tags(&entry, &[tag_id]).await?;
//! let mut entries = journal.live_entries_with_tags();
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod journal;
pub mod live;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult, JournalError, JournalResult};
pub use journal::Journal;
pub use live::{ChangeNotifier, LiveQuery, Table};
pub use migrations::{SchemaState, SCHEMA_VERSION};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::category::CategoryRepository;
pub use repository::entry::EntryRepository;
pub use repository::tag::TagRepository;
