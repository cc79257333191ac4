//! # Entry Detail State
//!
//! One entry with its tags, kept current by a live query.
//!
//! ```text
//!            live emits Some(e)            delete()
//!  Loading ─────────────────────► Success ──────────► Deleted
//!     │                              │
//!     │ live emits None / Err        │ live emits None / Err
//!     ▼                              ▼
//!   Error ◄──────────────────────────┘
//! ```
//!
//! `Deleted` is terminal: later emissions for the same id are ignored.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use skypass_core::{CoreError, TravelEntryWithTags};
use skypass_db::{Journal, LiveQuery};

use crate::error::ApiError;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "camelCase")]
pub enum EntryDetailState {
    Loading,
    Success(TravelEntryWithTags),
    Deleted,
    Error(String),
}

/// State holder for a single entry.
#[derive(Debug)]
pub struct EntryDetailModel {
    journal: Journal,
    entry_id: i64,
    state: Arc<watch::Sender<EntryDetailState>>,
    deleting: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl EntryDetailModel {
    /// Starts observing `entry_id`. Must be called inside a Tokio runtime.
    pub fn new(journal: Journal, entry_id: i64) -> Self {
        let state = Arc::new(watch::Sender::new(EntryDetailState::Loading));
        let deleting = Arc::new(AtomicBool::new(false));

        let live = journal.live_entry_with_tags(entry_id);
        let task = tokio::spawn(run(
            live,
            entry_id,
            Arc::clone(&state),
            Arc::clone(&deleting),
        ));

        EntryDetailModel {
            journal,
            entry_id,
            state,
            deleting,
            task,
        }
    }

    pub fn entry_id(&self) -> i64 {
        self.entry_id
    }

    pub fn subscribe(&self) -> watch::Receiver<EntryDetailState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> EntryDetailState {
        self.state.borrow().clone()
    }

    /// Deletes the shown entry.
    ///
    /// Does nothing while the entry has not been loaded.
    pub async fn delete(&self) -> Result<(), ApiError> {
        let entry = match &*self.state.borrow() {
            EntryDetailState::Success(with_tags) => with_tags.entry.clone(),
            _ => return Ok(()),
        };

        self.deleting.store(true, Ordering::SeqCst);
        match self.journal.delete_entry(&entry).await {
            Ok(()) => {
                info!(id = entry.id, "Entry deleted from detail view");
                self.state.send_replace(EntryDetailState::Deleted);
                Ok(())
            }
            Err(e) => {
                self.deleting.store(false, Ordering::SeqCst);
                let err = ApiError::from(e);
                self.state
                    .send_replace(EntryDetailState::Error(err.message.clone()));
                Err(err)
            }
        }
    }
}

impl Drop for EntryDetailModel {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run(
    mut live: LiveQuery<Option<TravelEntryWithTags>>,
    entry_id: i64,
    state: Arc<watch::Sender<EntryDetailState>>,
    deleting: Arc<AtomicBool>,
) {
    while let Some(result) = live.next().await {
        let next = match result {
            Ok(Some(with_tags)) => EntryDetailState::Success(with_tags),
            Ok(None) if deleting.load(Ordering::SeqCst) => EntryDetailState::Deleted,
            Ok(None) => {
                EntryDetailState::Error(ApiError::from(CoreError::EntryNotFound(entry_id)).message)
            }
            Err(e) => EntryDetailState::Error(ApiError::from(e).message),
        };

        state.send_if_modified(|current| {
            if *current == EntryDetailState::Deleted || *current == next {
                return false;
            }
            *current = next;
            true
        });
    }
    debug!(entry_id, "Entry detail subscription ended");
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use skypass_core::TravelEntry;
    use skypass_db::{Database, DbConfig};
    use std::time::Duration;

    async fn journal() -> Journal {
        Database::new(DbConfig::in_memory()).await.unwrap().journal()
    }

    async fn wait_until(
        model: &EntryDetailModel,
        pred: impl FnMut(&EntryDetailState) -> bool,
    ) -> EntryDetailState {
        let mut rx = model.subscribe();
        let state = tokio::time::timeout(Duration::from_secs(5), rx.wait_for(pred))
            .await
            .expect("state did not change")
            .expect("model dropped");
        state.clone()
    }

    #[tokio::test]
    async fn test_loads_entry_with_tags() {
        let journal = journal().await;
        let tag = journal.create_tag("Snow", "#FFFFFF").await.unwrap();
        let entry = TravelEntry::new("Ski day", "", Utc::now(), 46.0, 7.5, 90.0);
        let id = journal.save_entry_with_tags(&entry, &[tag]).await.unwrap();

        let model = EntryDetailModel::new(journal, id);
        let state = wait_until(&model, |s| *s != EntryDetailState::Loading).await;

        match state {
            EntryDetailState::Success(with_tags) => {
                assert_eq!(with_tags.entry.title, "Ski day");
                assert_eq!(with_tags.tag_ids(), vec![tag]);
            }
            other => panic!("unexpected state {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_entry_is_an_error() {
        let model = EntryDetailModel::new(journal().await, 404);

        let state = wait_until(&model, |s| *s != EntryDetailState::Loading).await;
        assert_eq!(
            state,
            EntryDetailState::Error("Travel entry 404 not found".to_string())
        );
    }

    #[tokio::test]
    async fn test_delete_ends_in_deleted() {
        let journal = journal().await;
        let entry = TravelEntry::new("Ski day", "", Utc::now(), 46.0, 7.5, 90.0);
        let id = journal.save_entry_with_tags(&entry, &[]).await.unwrap();

        let model = EntryDetailModel::new(journal.clone(), id);
        wait_until(&model, |s| matches!(s, EntryDetailState::Success(_))).await;

        model.delete().await.unwrap();

        assert_eq!(model.state(), EntryDetailState::Deleted);
        assert!(journal.get_entry(id).await.unwrap().is_none());

        // The live query's empty emission must not turn Deleted into an error
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(model.state(), EntryDetailState::Deleted);
    }

    #[tokio::test]
    async fn test_follows_edits() {
        let journal = journal().await;
        let mut entry = TravelEntry::new("Ski day", "", Utc::now(), 46.0, 7.5, 90.0);
        let id = journal.save_entry_with_tags(&entry, &[]).await.unwrap();

        let model = EntryDetailModel::new(journal.clone(), id);
        wait_until(&model, |s| matches!(s, EntryDetailState::Success(_))).await;

        entry.id = id;
        entry.title = "Powder day".to_string();
        journal.save_entry_with_tags(&entry, &[]).await.unwrap();

        wait_until(&model, |s| {
            matches!(s, EntryDetailState::Success(w) if w.entry.title == "Powder day")
        })
        .await;
    }

    #[tokio::test]
    async fn test_delete_before_load_is_a_no_op() {
        let model = EntryDetailModel::new(journal().await, 404);
        assert!(model.delete().await.is_ok());
    }
}
