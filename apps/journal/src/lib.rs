//! # Skypass App Library
//!
//! Composition root for the travel journal: opens the store, builds the
//! [`Journal`] and hands out state holders.
//!
//! ## Module Organization
//! ```text
//! skypass_app/
//! ├── lib.rs          ◄─── You are here (App startup, tracing)
//! ├── config.rs       ◄─── File + environment configuration
//! ├── location.rs     ◄─── Last-known position providers
//! ├── state/
//! │   ├── mod.rs          ◄─── State holder exports
//! │   ├── travel_log.rs   ◄─── Filtered journal list
//! │   ├── entry_detail.rs ◄─── Single entry view
//! │   └── entry_form.rs   ◄─── Add / edit form
//! └── error.rs        ◄─── ApiError for UI, AppError for startup
//! ```

pub mod config;
pub mod error;
pub mod location;
pub mod state;

use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, reload, EnvFilter, Registry};

use skypass_db::{Database, Journal};

use config::AppConfig;
use error::AppResult;
use location::LocationProvider;
use state::{EntryDetailModel, EntryFormModel, TravelLogModel};

/// A running application.
///
/// State holders receive their dependencies from here; nothing is global.
#[derive(Debug)]
pub struct App {
    config: AppConfig,
    db: Database,
    journal: Journal,
    location: Arc<dyn LocationProvider>,
}

impl App {
    /// Starts the application.
    ///
    /// ## Startup Sequence
    /// ```text
    /// ┌─────────────────────────────────────────────────────────────────────────┐
    /// │                       Application Startup                               │
    /// │                                                                         │
    /// │  1. Determine Database Path ──────────────────────────────────────────► │
    /// │     • [database].path, SKYPASS_DB_PATH, or the platform data dir        │
    /// │                                                                         │
    /// │  2. Connect to Database ──────────────────────────────────────────────► │
    /// │     • SQLite with WAL mode, foreign keys on                             │
    /// │     • Schema check (destructive recreate on version change)             │
    /// │     • Default categories on a fresh store                               │
    /// │                                                                         │
    /// │  3. Build Journal + Location Provider ────────────────────────────────► │
    /// └─────────────────────────────────────────────────────────────────────────┘
    /// ```
    pub async fn start(config: AppConfig) -> AppResult<Self> {
        let db_config = config.db_config()?;
        info!(path = ?db_config.database_path, "Opening journal store");

        let db = Database::new(db_config).await?;
        info!(schema = ?db.schema_state(), "Database connected");

        let journal = db.journal();
        let location = location::provider_for(config.fixed_location());

        Ok(App {
            config,
            db,
            journal,
            location,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    /// A new travel log list holder.
    pub fn travel_log(&self) -> TravelLogModel {
        TravelLogModel::new(self.journal.clone())
    }

    /// A new detail holder for `entry_id`.
    pub fn entry_detail(&self, entry_id: i64) -> EntryDetailModel {
        EntryDetailModel::new(self.journal.clone(), entry_id)
    }

    /// Opens the add form (`NEW_ID`) or the edit form for `entry_id`.
    pub async fn entry_form(&self, entry_id: i64) -> EntryFormModel {
        EntryFormModel::open(self.journal.clone(), entry_id, Arc::clone(&self.location)).await
    }

    /// Closes the store. Live subscriptions end.
    pub async fn shutdown(self) {
        self.db.close().await;
        info!("Journal store closed");
    }
}

/// Swaps the log filter of the running subscriber.
#[derive(Debug, Clone)]
pub struct LogFilterHandle {
    handle: reload::Handle<EnvFilter, Registry>,
    /// Set when `RUST_LOG` chose the filter; it is never replaced.
    pinned: bool,
}

impl LogFilterHandle {
    /// Replaces the filter with `filter`, unless `RUST_LOG` is set.
    pub fn set_filter(&self, filter: &str) {
        if self.pinned {
            return;
        }
        if let Err(e) = self.handle.reload(EnvFilter::new(filter)) {
            warn!("Failed to apply log filter {}: {}", filter, e);
        }
    }
}

/// Initializes the tracing subscriber for structured logging.
///
/// Call this before loading the config so config loading is logged, then
/// apply `[logging].filter` through the returned handle.
///
/// ## Log Levels
/// - `RUST_LOG` wins when set
/// - otherwise `filter`, until [`LogFilterHandle::set_filter`] replaces it
pub fn init_tracing(filter: &str) -> LogFilterHandle {
    let (filter, handle) = reloadable_filter(filter);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();

    handle
}

fn reloadable_filter(filter: &str) -> (reload::Layer<EnvFilter, Registry>, LogFilterHandle) {
    let (filter, pinned) = match EnvFilter::try_from_default_env() {
        Ok(from_env) => (from_env, true),
        Err(_) => (EnvFilter::new(filter), false),
    };
    let (layer, handle) = reload::Layer::new(filter);
    (layer, LogFilterHandle { handle, pinned })
}

#[cfg(test)]
mod tests {
    use super::*;
    use skypass_core::{TravelEntry, NEW_ID};
    use skypass_db::pool::IN_MEMORY_PATH;
    use std::path::PathBuf;

    fn memory_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.database.path = Some(PathBuf::from(IN_MEMORY_PATH));
        config.location.latitude = Some(38.72);
        config.location.longitude = Some(-9.14);
        config
    }

    #[tokio::test]
    async fn test_start_wires_state_holders() {
        let app = App::start(memory_config()).await.unwrap();

        let log = app.travel_log();
        assert!(log.settled().await.entries.is_empty());

        let form = app.entry_form(NEW_ID).await;
        assert_eq!(form.fields().latitude, 38.72);
        form.set_title("Tram 28");
        let id = form.save().await.unwrap();

        let detail = app.entry_detail(id);
        let mut rx = detail.subscribe();
        rx.wait_for(|s| matches!(s, state::EntryDetailState::Success(_)))
            .await
            .unwrap();

        app.shutdown().await;
    }

    #[test]
    fn test_log_filter_is_replaced_after_startup() {
        let (layer, handle) = reload::Layer::new(EnvFilter::new("error"));
        let handle = LogFilterHandle { handle, pinned: false };
        let subscriber = tracing_subscriber::registry().with(layer);

        tracing::subscriber::with_default(subscriber, || {
            handle.set_filter("warn");
            assert!(tracing::enabled!(tracing::Level::WARN));
            assert!(!tracing::enabled!(tracing::Level::INFO));

            handle.set_filter("debug");
            assert!(tracing::enabled!(tracing::Level::DEBUG));
        });
    }

    #[test]
    fn test_pinned_log_filter_is_kept() {
        let (layer, handle) = reload::Layer::new(EnvFilter::new("error"));
        let handle = LogFilterHandle { handle, pinned: true };
        let subscriber = tracing_subscriber::registry().with(layer);

        tracing::subscriber::with_default(subscriber, || {
            handle.set_filter("debug");
            assert!(!tracing::enabled!(tracing::Level::DEBUG));
        });
    }

    #[tokio::test]
    async fn test_start_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.database.path = Some(dir.path().join("skypass.db"));

        let app = App::start(config).await.unwrap();
        let entry = TravelEntry::new("Walk", "", chrono::Utc::now(), 1.0, 1.0, 0.0);
        app.journal().save_entry_with_tags(&entry, &[]).await.unwrap();

        assert_eq!(app.journal().count_entries().await.unwrap(), 1);
        app.shutdown().await;
    }
}
