//! # Journal
//!
//! The aggregation layer: one dependency that gives state holders every
//! entry, tag and category operation, plus the compound writes that must be
//! atomic.
//!
//! ## Save Entry With Tags
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  save_entry_with_tags(entry, [t1, t2])                                 │
//! │       │                                                                 │
//! │       ├── validate_entry (title, coordinates) ── Err → nothing written │
//! │       ▼                                                                 │
//! │  BEGIN                                                                 │
//! │       ├── upsert entry                  → id                           │
//! │       ├── entry.id != 0 ? clear (id, *) associations                   │
//! │       ├── add (id, t1), (id, t2)                                       │
//! │  COMMIT  ── any failure rolls the whole save back                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  notify [Entries, EntryTags]                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything not listed in the diagram is a pass-through to a repository.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use skypass_core::validation::{validate_category_name, validate_entry, validate_tag_name};
use skypass_core::{
    TravelCategory, TravelEntry, TravelEntryTagCrossRef, TravelEntryWithTags, TravelTag,
    DEFAULT_CATEGORY_COLOR,
};

use crate::error::{DbError, JournalResult};
use crate::live::{LiveQuery, Table};
use crate::pool::Database;
use crate::repository::category::CategoryRepository;
use crate::repository::entry::EntryRepository;
use crate::repository::tag::TagRepository;

/// Domain-level access to the journal store.
///
/// ## Usage
/// ```rust,ignore
/// let journal = db.journal();
///
/// let id = journal.save_entry_with_tags(&entry, &[alps, snow]).await?;
/// let mut detail = journal.live_entry_with_tags(id);
/// ```
#[derive(Debug, Clone)]
pub struct Journal {
    db: Database,
}

impl Journal {
    pub fn new(db: Database) -> Self {
        Journal { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    // =========================================================================
    // Compound operations
    // =========================================================================

    /// Saves an entry and replaces its tag set in one transaction.
    ///
    /// ## Returns
    /// The entry id (newly assigned when `entry.id == 0`).
    pub async fn save_entry_with_tags(
        &self,
        entry: &TravelEntry,
        tag_ids: &[i64],
    ) -> JournalResult<i64> {
        validate_entry(entry)?;

        let mut tx = self.db.pool().begin().await.map_err(DbError::from)?;

        let id = EntryRepository::insert_in(&mut tx, entry).await?;
        if !entry.is_new() {
            TagRepository::remove_all_for_entry_in(&mut tx, id).await?;
        }
        for tag_id in tag_ids {
            TagRepository::add_to_entry_in(&mut tx, id, *tag_id).await?;
        }

        tx.commit().await.map_err(DbError::from)?;

        info!(id, tags = tag_ids.len(), "Entry saved");
        self.db
            .notifier()
            .notify(&[Table::Entries, Table::EntryTags]);
        Ok(id)
    }

    /// Returns the id of the category called `name`, creating it if absent.
    ///
    /// An existing category keeps its color. The lookup and the insert are
    /// separate statements; the store has a single writer so nothing races.
    pub async fn create_category(&self, name: &str, color: &str) -> JournalResult<i64> {
        validate_category_name(name)?;

        if let Some(existing) = self.db.categories().get_by_name(name).await? {
            debug!(id = existing.id, category = %name, "Category already exists");
            return Ok(existing.id);
        }

        let id = self
            .db
            .categories()
            .insert(&TravelCategory::new(name, color))
            .await?;
        Ok(id)
    }

    /// Creates a tag.
    pub async fn create_tag(&self, name: &str, color: &str) -> JournalResult<i64> {
        validate_tag_name(name)?;

        let id = self.db.tags().insert(&TravelTag::new(name, color)).await?;
        Ok(id)
    }

    /// Renames a category in the catalog and on every entry that uses it.
    ///
    /// ## Returns
    /// Number of entries moved.
    pub async fn rename_category(&self, old: &str, new: &str) -> JournalResult<u64> {
        validate_category_name(new)?;
        if old == new {
            return Ok(0);
        }
        if self.db.categories().exists(new).await? {
            return Err(DbError::duplicate("category", new).into());
        }

        let mut tx = self.db.pool().begin().await.map_err(DbError::from)?;
        let renamed = CategoryRepository::rename_in(&mut tx, old, new).await?;
        let moved = EntryRepository::rename_category_in(&mut tx, old, new).await?;
        tx.commit().await.map_err(DbError::from)?;

        info!(old, new, renamed, moved, "Category renamed");
        self.db
            .notifier()
            .notify(&[Table::Entries, Table::Categories]);
        Ok(moved)
    }

    /// Runs the category bootstrap and registers every materialized name in
    /// the catalog, all in one transaction.
    ///
    /// ## Returns
    /// The names that were materialized.
    pub async fn bootstrap_categories(&self, names: &[String]) -> JournalResult<Vec<String>> {
        let mut tx = self.db.pool().begin().await.map_err(DbError::from)?;
        let materialized = EntryRepository::bootstrap_in(&mut tx, names).await?;
        for name in &materialized {
            CategoryRepository::insert_if_absent_in(&mut tx, name, DEFAULT_CATEGORY_COLOR).await?;
        }
        tx.commit().await.map_err(DbError::from)?;

        if !materialized.is_empty() {
            info!(count = materialized.len(), "Categories bootstrapped");
            self.db
                .notifier()
                .notify(&[Table::Entries, Table::Categories]);
        }
        Ok(materialized)
    }

    // =========================================================================
    // Entries
    // =========================================================================

    pub async fn insert_entry(&self, entry: &TravelEntry) -> JournalResult<i64> {
        Ok(self.db.entries().insert(entry).await?)
    }

    pub async fn update_entry(&self, entry: &TravelEntry) -> JournalResult<()> {
        Ok(self.db.entries().update(entry).await?)
    }

    pub async fn delete_entry(&self, entry: &TravelEntry) -> JournalResult<()> {
        Ok(self.db.entries().delete(entry).await?)
    }

    pub async fn delete_entry_by_id(&self, id: i64) -> JournalResult<bool> {
        Ok(self.db.entries().delete_by_id(id).await?)
    }

    pub async fn get_entry(&self, id: i64) -> JournalResult<Option<TravelEntry>> {
        Ok(self.db.entries().get_by_id(id).await?)
    }

    pub async fn count_entries(&self) -> JournalResult<i64> {
        Ok(self.db.entries().count().await?)
    }

    pub async fn count_entries_in_category(&self, category: &str) -> JournalResult<i64> {
        Ok(self.db.entries().count_by_category(category).await?)
    }

    pub fn live_entries(&self) -> LiveQuery<Vec<TravelEntry>> {
        self.db.entries().live_all()
    }

    pub fn live_entry_with_tags(&self, id: i64) -> LiveQuery<Option<TravelEntryWithTags>> {
        self.db.entries().live_with_tags(id)
    }

    pub fn live_entries_with_tags(&self) -> LiveQuery<Vec<TravelEntryWithTags>> {
        self.db.entries().live_all_with_tags()
    }

    pub fn live_entries_by_category(&self, category: &str) -> LiveQuery<Vec<TravelEntry>> {
        self.db.entries().live_by_category(category)
    }

    /// Entries dated within `[start, end]`. A reversed range matches nothing.
    pub fn live_entries_by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> LiveQuery<Vec<TravelEntry>> {
        self.db.entries().live_by_date_range(start, end)
    }

    /// Store-side substring search over title and description. The query is
    /// matched as given, whitespace included.
    pub fn search_entries(&self, query: &str) -> LiveQuery<Vec<TravelEntry>> {
        self.db.entries().live_search(query)
    }

    pub fn live_distinct_categories(&self) -> LiveQuery<Vec<String>> {
        self.db.entries().live_distinct_categories()
    }

    // =========================================================================
    // Tags
    // =========================================================================

    /// Inserts a tag, or replaces the one with the same id. Unvalidated.
    pub async fn insert_tag(&self, tag: &TravelTag) -> JournalResult<i64> {
        Ok(self.db.tags().insert(tag).await?)
    }

    pub async fn update_tag(&self, tag: &TravelTag) -> JournalResult<()> {
        Ok(self.db.tags().update(tag).await?)
    }

    pub async fn delete_tag(&self, tag: &TravelTag) -> JournalResult<()> {
        Ok(self.db.tags().delete(tag).await?)
    }

    pub async fn get_tag(&self, id: i64) -> JournalResult<Option<TravelTag>> {
        Ok(self.db.tags().get_by_id(id).await?)
    }

    pub async fn add_tag_to_entry(&self, entry_id: i64, tag_id: i64) -> JournalResult<()> {
        Ok(self.db.tags().add_to_entry(entry_id, tag_id).await?)
    }

    pub async fn remove_tag_from_entry(&self, entry_id: i64, tag_id: i64) -> JournalResult<bool> {
        Ok(self.db.tags().remove_from_entry(entry_id, tag_id).await?)
    }

    /// Detaches every tag from the entry.
    pub async fn remove_all_tags_from_entry(&self, entry_id: i64) -> JournalResult<u64> {
        Ok(self.db.tags().remove_all_for_entry(entry_id).await?)
    }

    pub async fn tag_refs_for_entry(
        &self,
        entry_id: i64,
    ) -> JournalResult<Vec<TravelEntryTagCrossRef>> {
        Ok(self.db.tags().cross_refs_for_entry(entry_id).await?)
    }

    pub fn live_tags(&self) -> LiveQuery<Vec<TravelTag>> {
        self.db.tags().live_all()
    }

    pub fn live_tags_for_entry(&self, entry_id: i64) -> LiveQuery<Vec<TravelTag>> {
        self.db.tags().live_for_entry(entry_id)
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// Inserts a category, or replaces the one with the same id.
    ///
    /// No name check; use [`create_category`](Self::create_category) for user input.
    pub async fn insert_category(&self, category: &TravelCategory) -> JournalResult<i64> {
        Ok(self.db.categories().insert(category).await?)
    }

    pub async fn update_category(&self, category: &TravelCategory) -> JournalResult<()> {
        Ok(self.db.categories().update(category).await?)
    }

    pub async fn delete_category(&self, category: &TravelCategory) -> JournalResult<()> {
        Ok(self.db.categories().delete(category).await?)
    }

    pub async fn get_category(&self, id: i64) -> JournalResult<Option<TravelCategory>> {
        Ok(self.db.categories().get_by_id(id).await?)
    }

    pub async fn get_category_by_name(&self, name: &str) -> JournalResult<Option<TravelCategory>> {
        Ok(self.db.categories().get_by_name(name).await?)
    }

    pub async fn category_exists(&self, name: &str) -> JournalResult<bool> {
        Ok(self.db.categories().exists(name).await?)
    }

    pub fn live_categories(&self) -> LiveQuery<Vec<TravelCategory>> {
        self.db.categories().live_all()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
