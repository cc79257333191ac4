//! # Entry Repository
//!
//! Database operations for travel entries.
//!
//! ## Key Operations
//! - Insert-or-replace (upsert by id), update, delete
//! - Live lists: all, by category, by date range, text search, distinct
//!   categories
//! - Live with-tags projections (entry + its tags, tags ordered by name)
//! - Category bootstrap via placeholder entries
//!
//! ## Insert-or-Replace
//! ```text
//! entry.id == 0  ──► INSERT ...                 → last_insert_rowid()
//! entry.id != 0  ──► INSERT ... ON CONFLICT(id) DO UPDATE SET ...
//!                    (row overwritten in place; its tag links survive)
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use tracing::debug;

use skypass_core::{TravelEntry, TravelEntryWithTags, TravelTag};

use super::from_millis;
use crate::error::{DbError, DbResult};
use crate::live::{ChangeNotifier, LiveQuery, Table};

const ENTRY_COLUMNS: &str = "id, title, description, date, latitude, longitude, \
                             compass_direction, distance, category, created_at, updated_at";

const ENTRY_TABLES: &[Table] = &[Table::Entries];
const WITH_TAGS_TABLES: &[Table] = &[Table::Entries, Table::Tags, Table::EntryTags];

// =============================================================================
// Row types
// =============================================================================

#[derive(Debug, FromRow)]
struct EntryRow {
    id: i64,
    title: String,
    description: String,
    date: i64,
    latitude: f64,
    longitude: f64,
    compass_direction: f64,
    distance: Option<f64>,
    category: String,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<EntryRow> for TravelEntry {
    type Error = DbError;

    fn try_from(row: EntryRow) -> DbResult<Self> {
        Ok(TravelEntry {
            id: row.id,
            title: row.title,
            description: row.description,
            date: from_millis("date", row.date)?,
            latitude: row.latitude,
            longitude: row.longitude,
            compass_direction: row.compass_direction as f32,
            distance: row.distance.map(|d| d as f32),
            category: row.category,
            created_at: from_millis("created_at", row.created_at)?,
            updated_at: from_millis("updated_at", row.updated_at)?,
        })
    }
}

/// A tag joined with the entry it is attached to.
#[derive(Debug, FromRow)]
struct EntryTagRow {
    entry_id: i64,
    id: i64,
    name: String,
    color: String,
}

fn into_entries(rows: Vec<EntryRow>) -> DbResult<Vec<TravelEntry>> {
    rows.into_iter().map(TravelEntry::try_from).collect()
}

/// Escapes LIKE wildcards so the query is matched literally.
fn like_pattern(query: &str) -> String {
    let escaped = query
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for travel entry database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.entries();
///
/// let id = repo.insert(&entry).await?;
/// let mut list = repo.live_all_with_tags();
/// while let Some(entries) = list.next().await { /* ... */ }
/// ```
#[derive(Debug, Clone)]
pub struct EntryRepository {
    pool: SqlitePool,
    notifier: ChangeNotifier,
}

impl EntryRepository {
    /// Creates a new EntryRepository.
    pub fn new(pool: SqlitePool, notifier: ChangeNotifier) -> Self {
        EntryRepository { pool, notifier }
    }

    // -------------------------------------------------------------------------
    // Writes
    // -------------------------------------------------------------------------

    /// Inserts a new entry or replaces the row with the same id.
    ///
    /// ## Returns
    /// The store-assigned id for a new entry, otherwise `entry.id`.
    pub async fn insert(&self, entry: &TravelEntry) -> DbResult<i64> {
        let mut conn = self.pool.acquire().await?;
        let id = Self::insert_in(&mut conn, entry).await?;
        self.notifier.notify(ENTRY_TABLES);
        Ok(id)
    }

    pub(crate) async fn insert_in(conn: &mut SqliteConnection, entry: &TravelEntry) -> DbResult<i64> {
        if entry.is_new() {
            let result = sqlx::query(
                r#"
                INSERT INTO travel_entries (
                    title, description, date, latitude, longitude,
                    compass_direction, distance, category, created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                "#,
            )
            .bind(&entry.title)
            .bind(&entry.description)
            .bind(entry.date.timestamp_millis())
            .bind(entry.latitude)
            .bind(entry.longitude)
            .bind(f64::from(entry.compass_direction))
            .bind(entry.distance.map(f64::from))
            .bind(&entry.category)
            .bind(entry.created_at.timestamp_millis())
            .bind(entry.updated_at.timestamp_millis())
            .execute(&mut *conn)
            .await?;

            let id = result.last_insert_rowid();
            debug!(id, category = %entry.category, "Entry inserted");
            return Ok(id);
        }

        sqlx::query(
            r#"
            INSERT INTO travel_entries (
                id, title, description, date, latitude, longitude,
                compass_direction, distance, category, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                description = excluded.description,
                date = excluded.date,
                latitude = excluded.latitude,
                longitude = excluded.longitude,
                compass_direction = excluded.compass_direction,
                distance = excluded.distance,
                category = excluded.category,
                created_at = excluded.created_at,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(entry.id)
        .bind(&entry.title)
        .bind(&entry.description)
        .bind(entry.date.timestamp_millis())
        .bind(entry.latitude)
        .bind(entry.longitude)
        .bind(f64::from(entry.compass_direction))
        .bind(entry.distance.map(f64::from))
        .bind(&entry.category)
        .bind(entry.created_at.timestamp_millis())
        .bind(entry.updated_at.timestamp_millis())
        .execute(&mut *conn)
        .await?;

        debug!(id = entry.id, category = %entry.category, "Entry replaced");
        Ok(entry.id)
    }

    /// Overwrites an existing entry.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - no entry with that id
    pub async fn update(&self, entry: &TravelEntry) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE travel_entries SET
                title = ?2,
                description = ?3,
                date = ?4,
                latitude = ?5,
                longitude = ?6,
                compass_direction = ?7,
                distance = ?8,
                category = ?9,
                created_at = ?10,
                updated_at = ?11
            WHERE id = ?1
            "#,
        )
        .bind(entry.id)
        .bind(&entry.title)
        .bind(&entry.description)
        .bind(entry.date.timestamp_millis())
        .bind(entry.latitude)
        .bind(entry.longitude)
        .bind(f64::from(entry.compass_direction))
        .bind(entry.distance.map(f64::from))
        .bind(&entry.category)
        .bind(entry.created_at.timestamp_millis())
        .bind(entry.updated_at.timestamp_millis())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("TravelEntry", entry.id));
        }

        debug!(id = entry.id, "Entry updated");
        self.notifier.notify(ENTRY_TABLES);
        Ok(())
    }

    /// Deletes an entry; its tag associations cascade away.
    ///
    /// Deleting an entry that is not stored is a no-op.
    pub async fn delete(&self, entry: &TravelEntry) -> DbResult<()> {
        self.delete_by_id(entry.id).await.map(|_| ())
    }

    /// Deletes an entry by id.
    ///
    /// ## Returns
    /// `true` if a row was removed.
    pub async fn delete_by_id(&self, id: i64) -> DbResult<bool> {
        let mut conn = self.pool.acquire().await?;
        let removed = Self::delete_by_id_in(&mut conn, id).await?;
        if removed {
            self.notifier.notify(&[Table::Entries, Table::EntryTags]);
        }
        Ok(removed)
    }

    pub(crate) async fn delete_by_id_in(conn: &mut SqliteConnection, id: i64) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM travel_entries WHERE id = ?1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        debug!(id, removed = result.rows_affected(), "Entry deleted");
        Ok(result.rows_affected() > 0)
    }

    /// Rewrites the category string on every entry in `old`.
    ///
    /// ## Returns
    /// Number of entries moved.
    pub async fn rename_category(&self, old: &str, new: &str) -> DbResult<u64> {
        let mut conn = self.pool.acquire().await?;
        let moved = Self::rename_category_in(&mut conn, old, new).await?;
        if moved > 0 {
            self.notifier.notify(ENTRY_TABLES);
        }
        Ok(moved)
    }

    pub(crate) async fn rename_category_in(
        conn: &mut SqliteConnection,
        old: &str,
        new: &str,
    ) -> DbResult<u64> {
        let result = sqlx::query("UPDATE travel_entries SET category = ?2 WHERE category = ?1")
            .bind(old)
            .bind(new)
            .execute(&mut *conn)
            .await?;

        debug!(old, new, moved = result.rows_affected(), "Entry categories renamed");
        Ok(result.rows_affected())
    }

    // -------------------------------------------------------------------------
    // Category bootstrap
    // -------------------------------------------------------------------------

    /// Makes each name visible to the distinct-category projection by
    /// inserting and immediately deleting a placeholder entry.
    ///
    /// Runs in one transaction, so a placeholder can never be left behind.
    ///
    /// ## Returns
    /// The names that were not yet in use and went through the routine.
    pub async fn bootstrap_categories(&self, names: &[String]) -> DbResult<Vec<String>> {
        let mut tx = self.pool.begin().await?;
        let materialized = Self::bootstrap_in(&mut tx, names).await?;
        tx.commit().await?;

        if !materialized.is_empty() {
            self.notifier.notify(ENTRY_TABLES);
        }
        Ok(materialized)
    }

    pub(crate) async fn bootstrap_in(
        conn: &mut SqliteConnection,
        names: &[String],
    ) -> DbResult<Vec<String>> {
        let in_use = Self::distinct_categories_in(&mut *conn).await?;
        let at = skypass_core::now_millis();
        let mut materialized: Vec<String> = Vec::new();

        for name in names {
            if in_use.contains(name) || materialized.contains(name) {
                continue;
            }

            let placeholder = TravelEntry::placeholder(name.clone(), at);
            let id = Self::insert_in(&mut *conn, &placeholder).await?;
            Self::delete_by_id_in(&mut *conn, id).await?;

            debug!(category = %name, placeholder_id = id, "Category bootstrapped");
            materialized.push(name.clone());
        }

        Ok(materialized)
    }

    // -------------------------------------------------------------------------
    // Point reads
    // -------------------------------------------------------------------------

    /// Gets an entry by its id.
    ///
    /// ## Returns
    /// * `Ok(Some(entry))` - found
    /// * `Ok(None)` - no entry with that id
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<TravelEntry>> {
        let mut conn = self.pool.acquire().await?;
        Self::get_by_id_in(&mut conn, id).await
    }

    pub(crate) async fn get_by_id_in(
        conn: &mut SqliteConnection,
        id: i64,
    ) -> DbResult<Option<TravelEntry>> {
        let query = format!("SELECT {ENTRY_COLUMNS} FROM travel_entries WHERE id = ?1");
        let row = sqlx::query_as::<_, EntryRow>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

        row.map(TravelEntry::try_from).transpose()
    }

    /// Number of stored entries.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM travel_entries")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Number of entries in a category.
    pub async fn count_by_category(&self, category: &str) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM travel_entries WHERE category = ?1")
                .bind(category)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    // -------------------------------------------------------------------------
    // Live queries
    // -------------------------------------------------------------------------

    /// All entries, newest date first.
    pub fn live_all(&self) -> LiveQuery<Vec<TravelEntry>> {
        let pool = self.pool.clone();
        LiveQuery::spawn(&self.notifier, ENTRY_TABLES, move || {
            let pool = pool.clone();
            async move {
                let mut conn = pool.acquire().await?;
                Self::fetch_all(&mut conn).await
            }
        })
    }

    /// One entry with its tags; `None` while the entry doesn't exist.
    pub fn live_with_tags(&self, id: i64) -> LiveQuery<Option<TravelEntryWithTags>> {
        let pool = self.pool.clone();
        LiveQuery::spawn(&self.notifier, WITH_TAGS_TABLES, move || {
            let pool = pool.clone();
            async move {
                let mut tx = pool.begin().await?;
                let entry = Self::get_by_id_in(&mut tx, id).await?;
                let with_tags = match entry {
                    Some(entry) => Self::attach_tags(&mut tx, vec![entry], Some(id))
                        .await?
                        .pop(),
                    None => None,
                };
                tx.commit().await?;
                Ok(with_tags)
            }
        })
    }

    /// Every entry with its tags, newest date first.
    pub fn live_all_with_tags(&self) -> LiveQuery<Vec<TravelEntryWithTags>> {
        let pool = self.pool.clone();
        LiveQuery::spawn(&self.notifier, WITH_TAGS_TABLES, move || {
            let pool = pool.clone();
            async move {
                let mut tx = pool.begin().await?;
                let entries = Self::fetch_all(&mut tx).await?;
                let with_tags = Self::attach_tags(&mut tx, entries, None).await?;
                tx.commit().await?;
                Ok(with_tags)
            }
        })
    }

    /// Entries in exactly `category`, newest date first.
    pub fn live_by_category(&self, category: impl Into<String>) -> LiveQuery<Vec<TravelEntry>> {
        let pool = self.pool.clone();
        let category = category.into();
        LiveQuery::spawn(&self.notifier, ENTRY_TABLES, move || {
            let pool = pool.clone();
            let category = category.clone();
            async move {
                let query = format!(
                    "SELECT {ENTRY_COLUMNS} FROM travel_entries WHERE category = ?1 ORDER BY date DESC"
                );
                let rows = sqlx::query_as::<_, EntryRow>(&query)
                    .bind(category)
                    .fetch_all(&pool)
                    .await?;
                into_entries(rows)
            }
        })
    }

    /// Entries dated within `[start, end]`, newest first.
    pub fn live_by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> LiveQuery<Vec<TravelEntry>> {
        let pool = self.pool.clone();
        let (start, end) = (start.timestamp_millis(), end.timestamp_millis());
        LiveQuery::spawn(&self.notifier, ENTRY_TABLES, move || {
            let pool = pool.clone();
            async move {
                let query = format!(
                    "SELECT {ENTRY_COLUMNS} FROM travel_entries \
                     WHERE date >= ?1 AND date <= ?2 ORDER BY date DESC"
                );
                let rows = sqlx::query_as::<_, EntryRow>(&query)
                    .bind(start)
                    .bind(end)
                    .fetch_all(&pool)
                    .await?;
                into_entries(rows)
            }
        })
    }

    /// Entries whose title or description contains `query`.
    ///
    /// Uses SQLite `LIKE`, so matching is case-insensitive for ASCII only.
    pub fn live_search(&self, query: &str) -> LiveQuery<Vec<TravelEntry>> {
        let pool = self.pool.clone();
        let pattern = like_pattern(query);
        LiveQuery::spawn(&self.notifier, ENTRY_TABLES, move || {
            let pool = pool.clone();
            let pattern = pattern.clone();
            async move {
                let query = format!(
                    r"SELECT {ENTRY_COLUMNS} FROM travel_entries
                      WHERE title LIKE ?1 ESCAPE '\' OR description LIKE ?1 ESCAPE '\'
                      ORDER BY date DESC"
                );
                let rows = sqlx::query_as::<_, EntryRow>(&query)
                    .bind(pattern)
                    .fetch_all(&pool)
                    .await?;
                into_entries(rows)
            }
        })
    }

    /// Distinct category names in use by entries, ascending.
    pub fn live_distinct_categories(&self) -> LiveQuery<Vec<String>> {
        let pool = self.pool.clone();
        LiveQuery::spawn(&self.notifier, ENTRY_TABLES, move || {
            let pool = pool.clone();
            async move {
                let mut conn = pool.acquire().await?;
                Self::distinct_categories_in(&mut conn).await
            }
        })
    }

    // -------------------------------------------------------------------------
    // Query helpers
    // -------------------------------------------------------------------------

    async fn fetch_all(conn: &mut SqliteConnection) -> DbResult<Vec<TravelEntry>> {
        let query = format!("SELECT {ENTRY_COLUMNS} FROM travel_entries ORDER BY date DESC");
        let rows = sqlx::query_as::<_, EntryRow>(&query)
            .fetch_all(&mut *conn)
            .await?;
        into_entries(rows)
    }

    async fn distinct_categories_in(conn: &mut SqliteConnection) -> DbResult<Vec<String>> {
        let names: Vec<String> =
            sqlx::query_scalar("SELECT DISTINCT category FROM travel_entries ORDER BY category ASC")
                .fetch_all(&mut *conn)
                .await?;
        Ok(names)
    }

    /// Loads tags for `entries` (all entries, or just `only`) in one join.
    async fn attach_tags(
        conn: &mut SqliteConnection,
        entries: Vec<TravelEntry>,
        only: Option<i64>,
    ) -> DbResult<Vec<TravelEntryWithTags>> {
        let rows = sqlx::query_as::<_, EntryTagRow>(
            r#"
            SELECT x.entry_id, t.id, t.name, t.color
            FROM travel_entry_tag_cross_ref x
            INNER JOIN travel_tags t ON t.id = x.tag_id
            WHERE ?1 IS NULL OR x.entry_id = ?1
            ORDER BY t.name ASC, t.id ASC
            "#,
        )
        .bind(only)
        .fetch_all(&mut *conn)
        .await?;

        let mut by_entry: HashMap<i64, Vec<TravelTag>> = HashMap::new();
        for row in rows {
            by_entry.entry(row.entry_id).or_default().push(TravelTag {
                id: row.id,
                name: row.name,
                color: row.color,
            });
        }

        Ok(entries
            .into_iter()
            .map(|entry| {
                let tags = by_entry.remove(&entry.id).unwrap_or_default();
                TravelEntryWithTags { entry, tags }
            })
            .collect())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::TimeZone;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, d, 12, 0, 0).unwrap()
    }

    fn entry(title: &str, d: u32, category: &str) -> TravelEntry {
        TravelEntry::new(title, "", day(d), 45.0, 7.0, 90.0).with_category(category)
    }

    #[tokio::test]
    async fn test_insert_assigns_id_and_round_trips() {
        let db = test_db().await;
        let repo = db.entries();

        let saved = entry("Hike", 1, "Hiking").with_distance(Some(12.5));
        let id = repo.insert(&saved).await.unwrap();
        assert!(id > 0);

        let fetched = repo.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(fetched, saved.with_id(id));
    }

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let db = test_db().await;
        assert!(db.entries().get_by_id(404).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_with_id_replaces_row_and_keeps_tags() {
        let db = test_db().await;
        let repo = db.entries();
        let id = repo.insert(&entry("Hike", 1, "Hiking")).await.unwrap();
        let tag_id = db.tags().insert(&TravelTag::new("Alps", "#112233")).await.unwrap();
        db.tags().add_to_entry(id, tag_id).await.unwrap();

        let replaced = entry("Summit", 2, "General").with_id(id);
        assert_eq!(repo.insert(&replaced).await.unwrap(), id);

        assert_eq!(repo.get_by_id(id).await.unwrap().unwrap().title, "Summit");
        assert_eq!(repo.count().await.unwrap(), 1);
        assert_eq!(db.tags().cross_refs_for_entry(id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let db = test_db().await;
        let err = db
            .entries()
            .update(&entry("Ghost", 1, "General").with_id(99))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_by_id_reports_removal() {
        let db = test_db().await;
        let repo = db.entries();
        let id = repo.insert(&entry("Hike", 1, "Hiking")).await.unwrap();

        assert!(repo.delete_by_id(id).await.unwrap());
        assert!(!repo.delete_by_id(id).await.unwrap());
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_live_all_orders_by_date_desc_and_updates() {
        let db = test_db().await;
        let repo = db.entries();
        repo.insert(&entry("Old", 1, "General")).await.unwrap();
        repo.insert(&entry("New", 9, "General")).await.unwrap();

        let mut live = repo.live_all();
        let titles = |entries: Vec<TravelEntry>| -> Vec<String> {
            entries.into_iter().map(|e| e.title).collect()
        };
        assert_eq!(titles(live.next().await.unwrap().unwrap()), vec!["New", "Old"]);

        repo.insert(&entry("Middle", 5, "General")).await.unwrap();
        assert_eq!(
            titles(live.next().await.unwrap().unwrap()),
            vec!["New", "Middle", "Old"]
        );
    }

    #[tokio::test]
    async fn test_live_by_category_and_date_range() {
        let db = test_db().await;
        let repo = db.entries();
        repo.insert(&entry("A", 1, "Hiking")).await.unwrap();
        repo.insert(&entry("B", 5, "City Tour")).await.unwrap();
        repo.insert(&entry("C", 10, "Hiking")).await.unwrap();

        let hiking = repo.live_by_category("Hiking").first().await.unwrap();
        assert_eq!(hiking.iter().map(|e| e.title.as_str()).collect::<Vec<_>>(), vec!["C", "A"]);

        // Bounds are inclusive
        let range = repo.live_by_date_range(day(1), day(5)).first().await.unwrap();
        assert_eq!(range.iter().map(|e| e.title.as_str()).collect::<Vec<_>>(), vec!["B", "A"]);
    }

    #[tokio::test]
    async fn test_live_search_title_or_description() {
        let db = test_db().await;
        let repo = db.entries();
        repo.insert(&TravelEntry::new("Lake walk", "", day(1), 1.0, 1.0, 0.0)).await.unwrap();
        repo.insert(&TravelEntry::new("Old town", "by the LAKE", day(2), 1.0, 1.0, 0.0)).await.unwrap();
        repo.insert(&TravelEntry::new("100% fun", "", day(3), 1.0, 1.0, 0.0)).await.unwrap();

        let found = repo.live_search("lake").first().await.unwrap();
        assert_eq!(found.len(), 2);

        // Wildcards are matched literally
        let found = repo.live_search("%").first().await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "100% fun");
    }

    #[tokio::test]
    async fn test_distinct_categories_and_counts() {
        let db = test_db().await;
        let repo = db.entries();
        repo.insert(&entry("A", 1, "Hiking")).await.unwrap();
        repo.insert(&entry("B", 2, "City Tour")).await.unwrap();
        repo.insert(&entry("C", 3, "Hiking")).await.unwrap();

        let names = repo.live_distinct_categories().first().await.unwrap();
        assert_eq!(names, vec!["City Tour", "Hiking"]);
        assert_eq!(repo.count_by_category("Hiking").await.unwrap(), 2);

        assert_eq!(repo.rename_category("Hiking", "Trekking").await.unwrap(), 2);
        assert_eq!(repo.count_by_category("Hiking").await.unwrap(), 0);
        assert_eq!(repo.count_by_category("Trekking").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_live_with_tags_orders_tags_by_name() {
        let db = test_db().await;
        let id = db.entries().insert(&entry("Hike", 1, "Hiking")).await.unwrap();
        let snow = db.tags().insert(&TravelTag::new("Snow", "#FFFFFF")).await.unwrap();
        let alps = db.tags().insert(&TravelTag::new("Alps", "#000000")).await.unwrap();
        db.tags().add_to_entry(id, snow).await.unwrap();
        db.tags().add_to_entry(id, alps).await.unwrap();

        let with_tags = db.entries().live_with_tags(id).first().await.unwrap().unwrap();
        assert_eq!(with_tags.tag_ids(), vec![alps, snow]);

        assert!(db.entries().live_with_tags(id + 1).first().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_bootstrap_leaves_no_placeholder() {
        let db = test_db().await;
        let repo = db.entries();
        repo.insert(&entry("A", 1, "Hiking")).await.unwrap();

        let names = vec!["Hiking".to_string(), "Kayaking".to_string(), "Kayaking".to_string()];
        let materialized = repo.bootstrap_categories(&names).await.unwrap();

        assert_eq!(materialized, vec!["Kayaking"]);
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("lake"), "%lake%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }
}
