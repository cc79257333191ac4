//! # Tag Repository
//!
//! Database operations for tags and their entry associations.
//!
//! ## Association Lifecycle
//! ```text
//! add_to_entry(e, t)          → row (e, t) in travel_entry_tag_cross_ref
//! remove_from_entry(e, t)     → that row gone
//! remove_all_for_entry(e)     → every (e, *) row gone
//! delete tag t                → every (*, t) row cascades away
//! delete entry e              → every (e, *) row cascades away
//! ```

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use skypass_core::{TravelEntryTagCrossRef, TravelTag};

use crate::error::{DbError, DbResult};
use crate::live::{ChangeNotifier, LiveQuery, Table};

const TAG_TABLES: &[Table] = &[Table::Tags];
const ENTRY_TAG_TABLES: &[Table] = &[Table::Tags, Table::EntryTags];

/// Repository for tag database operations.
#[derive(Debug, Clone)]
pub struct TagRepository {
    pool: SqlitePool,
    notifier: ChangeNotifier,
}

impl TagRepository {
    /// Creates a new TagRepository.
    pub fn new(pool: SqlitePool, notifier: ChangeNotifier) -> Self {
        TagRepository { pool, notifier }
    }

    /// Inserts a new tag or replaces the row with the same id.
    pub async fn insert(&self, tag: &TravelTag) -> DbResult<i64> {
        let id = if tag.id == skypass_core::NEW_ID {
            sqlx::query("INSERT INTO travel_tags (name, color) VALUES (?1, ?2)")
                .bind(&tag.name)
                .bind(&tag.color)
                .execute(&self.pool)
                .await?
                .last_insert_rowid()
        } else {
            sqlx::query(
                r#"
                INSERT INTO travel_tags (id, name, color) VALUES (?1, ?2, ?3)
                ON CONFLICT(id) DO UPDATE SET name = excluded.name, color = excluded.color
                "#,
            )
            .bind(tag.id)
            .bind(&tag.name)
            .bind(&tag.color)
            .execute(&self.pool)
            .await?;
            tag.id
        };

        debug!(id, name = %tag.name, "Tag saved");
        self.notifier.notify(TAG_TABLES);
        Ok(id)
    }

    /// Renames or recolors an existing tag.
    pub async fn update(&self, tag: &TravelTag) -> DbResult<()> {
        let result = sqlx::query("UPDATE travel_tags SET name = ?2, color = ?3 WHERE id = ?1")
            .bind(tag.id)
            .bind(&tag.name)
            .bind(&tag.color)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("TravelTag", tag.id));
        }

        debug!(id = tag.id, "Tag updated");
        self.notifier.notify(TAG_TABLES);
        Ok(())
    }

    /// Deletes a tag. Entries keep their other tags.
    pub async fn delete(&self, tag: &TravelTag) -> DbResult<()> {
        self.delete_by_id(tag.id).await.map(|_| ())
    }

    /// Deletes a tag by id; `true` if a row was removed.
    pub async fn delete_by_id(&self, id: i64) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM travel_tags WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        let removed = result.rows_affected() > 0;
        debug!(id, removed, "Tag deleted");
        if removed {
            self.notifier.notify(ENTRY_TAG_TABLES);
        }
        Ok(removed)
    }

    /// Gets a tag by its id.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<TravelTag>> {
        let tag = sqlx::query_as::<_, TravelTag>(
            "SELECT id, name, color FROM travel_tags WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(tag)
    }

    /// Every tag, ordered by name.
    pub fn live_all(&self) -> LiveQuery<Vec<TravelTag>> {
        let pool = self.pool.clone();
        LiveQuery::spawn(&self.notifier, TAG_TABLES, move || {
            let pool = pool.clone();
            async move {
                let tags = sqlx::query_as::<_, TravelTag>(
                    "SELECT id, name, color FROM travel_tags ORDER BY name ASC, id ASC",
                )
                .fetch_all(&pool)
                .await?;
                Ok(tags)
            }
        })
    }

    // -------------------------------------------------------------------------
    // Entry associations
    // -------------------------------------------------------------------------

    /// Attaches a tag to an entry. Attaching twice is a no-op.
    ///
    /// ## Returns
    /// * `Err(DbError::ForeignKeyViolation)` - entry or tag doesn't exist
    pub async fn add_to_entry(&self, entry_id: i64, tag_id: i64) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;
        Self::add_to_entry_in(&mut conn, entry_id, tag_id).await?;
        self.notifier.notify(&[Table::EntryTags]);
        Ok(())
    }

    pub(crate) async fn add_to_entry_in(
        conn: &mut SqliteConnection,
        entry_id: i64,
        tag_id: i64,
    ) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO travel_entry_tag_cross_ref (entry_id, tag_id) VALUES (?1, ?2)
            ON CONFLICT(entry_id, tag_id) DO NOTHING
            "#,
        )
        .bind(entry_id)
        .bind(tag_id)
        .execute(&mut *conn)
        .await?;

        debug!(entry_id, tag_id, "Tag added to entry");
        Ok(())
    }

    /// Detaches one tag from an entry; `true` if it was attached.
    pub async fn remove_from_entry(&self, entry_id: i64, tag_id: i64) -> DbResult<bool> {
        let result = sqlx::query(
            "DELETE FROM travel_entry_tag_cross_ref WHERE entry_id = ?1 AND tag_id = ?2",
        )
        .bind(entry_id)
        .bind(tag_id)
        .execute(&self.pool)
        .await?;

        let removed = result.rows_affected() > 0;
        debug!(entry_id, tag_id, removed, "Tag removed from entry");
        if removed {
            self.notifier.notify(&[Table::EntryTags]);
        }
        Ok(removed)
    }

    /// Detaches every tag from an entry.
    ///
    /// ## Returns
    /// Number of associations removed.
    pub async fn remove_all_for_entry(&self, entry_id: i64) -> DbResult<u64> {
        let mut conn = self.pool.acquire().await?;
        let removed = Self::remove_all_for_entry_in(&mut conn, entry_id).await?;
        if removed > 0 {
            self.notifier.notify(&[Table::EntryTags]);
        }
        Ok(removed)
    }

    pub(crate) async fn remove_all_for_entry_in(
        conn: &mut SqliteConnection,
        entry_id: i64,
    ) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM travel_entry_tag_cross_ref WHERE entry_id = ?1")
            .bind(entry_id)
            .execute(&mut *conn)
            .await?;

        debug!(entry_id, removed = result.rows_affected(), "Entry tags cleared");
        Ok(result.rows_affected())
    }

    /// Raw association rows for an entry, by tag id.
    pub async fn cross_refs_for_entry(&self, entry_id: i64) -> DbResult<Vec<TravelEntryTagCrossRef>> {
        let refs = sqlx::query_as::<_, TravelEntryTagCrossRef>(
            r#"
            SELECT entry_id, tag_id FROM travel_entry_tag_cross_ref
            WHERE entry_id = ?1
            ORDER BY tag_id ASC
            "#,
        )
        .bind(entry_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(refs)
    }

    /// Tags attached to an entry, ordered by name.
    pub fn live_for_entry(&self, entry_id: i64) -> LiveQuery<Vec<TravelTag>> {
        let pool = self.pool.clone();
        LiveQuery::spawn(&self.notifier, ENTRY_TAG_TABLES, move || {
            let pool = pool.clone();
            async move {
                let tags = sqlx::query_as::<_, TravelTag>(
                    r#"
                    SELECT t.id, t.name, t.color
                    FROM travel_tags t
                    INNER JOIN travel_entry_tag_cross_ref x ON x.tag_id = t.id
                    WHERE x.entry_id = ?1
                    ORDER BY t.name ASC, t.id ASC
                    "#,
                )
                .bind(entry_id)
                .fetch_all(&pool)
                .await?;
                Ok(tags)
            }
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
