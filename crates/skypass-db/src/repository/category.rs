//! # Category Repository
//!
//! Database operations for the category catalog.
//!
//! Names are unique by convention only: the table has no UNIQUE constraint.
//! Seeding uses [`insert_if_absent_in`](CategoryRepository::insert_if_absent_in)
//! and user creation goes through the Journal's check-then-insert.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use skypass_core::{TravelCategory, DEFAULT_CATEGORIES};

use crate::error::{DbError, DbResult};
use crate::live::{ChangeNotifier, LiveQuery, Table};

const CATEGORY_TABLES: &[Table] = &[Table::Categories];

/// Repository for category database operations.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
    notifier: ChangeNotifier,
}

impl CategoryRepository {
    /// Creates a new CategoryRepository.
    pub fn new(pool: SqlitePool, notifier: ChangeNotifier) -> Self {
        CategoryRepository { pool, notifier }
    }

    /// Inserts a new category or replaces the row with the same id.
    ///
    /// Does not check for an existing name.
    pub async fn insert(&self, category: &TravelCategory) -> DbResult<i64> {
        let mut conn = self.pool.acquire().await?;
        let id = Self::insert_in(&mut conn, category).await?;
        self.notifier.notify(CATEGORY_TABLES);
        Ok(id)
    }

    pub(crate) async fn insert_in(
        conn: &mut SqliteConnection,
        category: &TravelCategory,
    ) -> DbResult<i64> {
        let id = if category.id == skypass_core::NEW_ID {
            sqlx::query("INSERT INTO travel_categories (name, color) VALUES (?1, ?2)")
                .bind(&category.name)
                .bind(&category.color)
                .execute(&mut *conn)
                .await?
                .last_insert_rowid()
        } else {
            sqlx::query(
                r#"
                INSERT INTO travel_categories (id, name, color) VALUES (?1, ?2, ?3)
                ON CONFLICT(id) DO UPDATE SET name = excluded.name, color = excluded.color
                "#,
            )
            .bind(category.id)
            .bind(&category.name)
            .bind(&category.color)
            .execute(&mut *conn)
            .await?;
            category.id
        };

        debug!(id, category = %category.name, "Category saved");
        Ok(id)
    }

    /// Inserts `name` unless a category with that name exists.
    ///
    /// ## Returns
    /// The new id, or `None` if the name was already present.
    pub(crate) async fn insert_if_absent_in(
        conn: &mut SqliteConnection,
        name: &str,
        color: &str,
    ) -> DbResult<Option<i64>> {
        let result = sqlx::query(
            r#"
            INSERT INTO travel_categories (name, color)
            SELECT ?1, ?2
            WHERE NOT EXISTS (SELECT 1 FROM travel_categories WHERE name = ?1)
            "#,
        )
        .bind(name)
        .bind(color)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            debug!(category = %name, "Category already present");
            return Ok(None);
        }

        let id = result.last_insert_rowid();
        debug!(id, category = %name, "Category added");
        Ok(Some(id))
    }

    /// Seeds the default categories, skipping names already present.
    ///
    /// ## Returns
    /// Number of categories inserted.
    pub async fn insert_defaults(&self) -> DbResult<usize> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;
        for (name, color) in DEFAULT_CATEGORIES {
            if Self::insert_if_absent_in(&mut tx, name, color).await?.is_some() {
                inserted += 1;
            }
        }
        tx.commit().await?;

        if inserted > 0 {
            self.notifier.notify(CATEGORY_TABLES);
        }
        Ok(inserted)
    }

    /// Renames or recolors an existing category.
    ///
    /// Entries keep their old category string; use the Journal's
    /// `rename_category` to move them too.
    pub async fn update(&self, category: &TravelCategory) -> DbResult<()> {
        let result =
            sqlx::query("UPDATE travel_categories SET name = ?2, color = ?3 WHERE id = ?1")
                .bind(category.id)
                .bind(&category.name)
                .bind(&category.color)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("TravelCategory", category.id));
        }

        debug!(id = category.id, "Category updated");
        self.notifier.notify(CATEGORY_TABLES);
        Ok(())
    }

    /// Deletes a category. Entries in it keep their category string.
    pub async fn delete(&self, category: &TravelCategory) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM travel_categories WHERE id = ?1")
            .bind(category.id)
            .execute(&self.pool)
            .await?;

        debug!(id = category.id, removed = result.rows_affected(), "Category deleted");
        if result.rows_affected() > 0 {
            self.notifier.notify(CATEGORY_TABLES);
        }
        Ok(())
    }

    /// Renames every category row called `old`.
    pub(crate) async fn rename_in(
        conn: &mut SqliteConnection,
        old: &str,
        new: &str,
    ) -> DbResult<u64> {
        let result = sqlx::query("UPDATE travel_categories SET name = ?2 WHERE name = ?1")
            .bind(old)
            .bind(new)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected())
    }

    /// Gets a category by its id.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<TravelCategory>> {
        let category = sqlx::query_as::<_, TravelCategory>(
            "SELECT id, name, color FROM travel_categories WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(category)
    }

    /// Gets the first category with this exact name.
    pub async fn get_by_name(&self, name: &str) -> DbResult<Option<TravelCategory>> {
        let category = sqlx::query_as::<_, TravelCategory>(
            "SELECT id, name, color FROM travel_categories WHERE name = ?1 ORDER BY id ASC LIMIT 1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(category)
    }

    /// True if a category with this exact name exists.
    pub async fn exists(&self, name: &str) -> DbResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM travel_categories WHERE name = ?1)",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Every category, ordered by name.
    pub fn live_all(&self) -> LiveQuery<Vec<TravelCategory>> {
        let pool = self.pool.clone();
        LiveQuery::spawn(&self.notifier, CATEGORY_TABLES, move || {
            let pool = pool.clone();
            async move {
                let categories = sqlx::query_as::<_, TravelCategory>(
                    "SELECT id, name, color FROM travel_categories ORDER BY name ASC, id ASC",
                )
                .fetch_all(&pool)
                .await?;
                Ok(categories)
            }
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
