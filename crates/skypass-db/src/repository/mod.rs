//! # Repository Module
//!
//! The persistence gateway: one repository per table family.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Layout                                    │
//! │                                                                         │
//! │  Journal / state holder                                                │
//! │       │                                                                 │
//! │       │  db.entries().live_all_with_tags()                             │
//! │       ▼                                                                 │
//! │  EntryRepository ─────┐                                                │
//! │  TagRepository ───────┼── SqlitePool ──► SQLite                        │
//! │  CategoryRepository ──┘        │                                        │
//! │       │                        │ after commit                           │
//! │       └──────────────► ChangeNotifier ──► LiveQuery re-runs            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Repositories surface whatever the store raises and never retry. They do
//! not enforce business rules (blank titles, duplicate names); the
//! [`Journal`](crate::Journal) does.
//!
//! Each compound-capable write also has a `*_in(&mut SqliteConnection, ..)`
//! form so the Journal can run several of them in one transaction.
//!
//! ## Available Repositories
//!
//! - [`EntryRepository`](entry::EntryRepository) - entries, with-tags joins, category bootstrap
//! - [`TagRepository`](tag::TagRepository) - tags and entry associations
//! - [`CategoryRepository`](category::CategoryRepository) - category catalog

use chrono::{DateTime, Utc};

use crate::error::{DbError, DbResult};

pub mod category;
pub mod entry;
pub mod tag;

/// Maps a stored epoch-millisecond value back to a timestamp.
pub(crate) fn from_millis(field: &str, millis: i64) -> DbResult<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| DbError::InvalidData(format!("{field} out of range: {millis}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_millis() {
        let at = from_millis("date", 1_700_000_000_123).unwrap();
        assert_eq!(at.timestamp_millis(), 1_700_000_000_123);

        let err = from_millis("date", i64::MAX).unwrap_err();
        assert!(matches!(err, DbError::InvalidData(_)));
    }
}
