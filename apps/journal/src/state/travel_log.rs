//! # Travel Log State
//!
//! The journal list: every entry with its tags, narrowed by a category filter
//! and a search query.
//!
//! ## Recompute Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Travel Log Recompute                                 │
//! │                                                                         │
//! │  live_entries_with_tags() ──┐                                           │
//! │   (store changed)           │                                           │
//! │                             ├──► select! ──► EntryFilter::apply ──►     │
//! │  set_category_filter() ──┐  │                 watch::Sender<View>       │
//! │  set_search_query()  ────┴──┘                                           │
//! │   (watch::Sender<EntryFilter>)                                          │
//! │                                                                         │
//! │  Any input change re-filters the latest full list. The state leaves    │
//! │  Loading only when the live query itself produces a result.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use skypass_core::{EntryFilter, TravelEntry, TravelEntryWithTags, TravelTag};
use skypass_db::{Journal, LiveQuery};

use crate::error::ApiError;

/// Status of the list screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "camelCase")]
pub enum TravelLogUiState {
    Loading,
    Success,
    Error(String),
}

impl TravelLogUiState {
    pub fn is_loading(&self) -> bool {
        matches!(self, TravelLogUiState::Loading)
    }
}

/// Snapshot published to subscribers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TravelLogView {
    pub state: TravelLogUiState,
    /// Entries passing the current filter, newest first.
    pub entries: Vec<TravelEntryWithTags>,
    pub filter: EntryFilter,
    /// Size of the unfiltered list.
    pub total: usize,
}

impl Default for TravelLogView {
    fn default() -> Self {
        TravelLogView {
            state: TravelLogUiState::Loading,
            entries: Vec::new(),
            filter: EntryFilter::default(),
            total: 0,
        }
    }
}

/// State holder for the travel log list.
///
/// Dropping the model stops its live subscription.
#[derive(Debug)]
pub struct TravelLogModel {
    journal: Journal,
    filter: watch::Sender<EntryFilter>,
    view: Arc<watch::Sender<TravelLogView>>,
    task: JoinHandle<()>,
}

impl TravelLogModel {
    /// Starts observing the journal. Must be called inside a Tokio runtime.
    pub fn new(journal: Journal) -> Self {
        let (filter, filter_rx) = watch::channel(EntryFilter::default());
        let view = Arc::new(watch::Sender::new(TravelLogView::default()));

        let live = journal.live_entries_with_tags();
        let task = tokio::spawn(run(live, filter_rx, Arc::clone(&view)));

        TravelLogModel {
            journal,
            filter,
            view,
            task,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<TravelLogView> {
        self.view.subscribe()
    }

    /// Current snapshot.
    pub fn view(&self) -> TravelLogView {
        self.view.borrow().clone()
    }

    /// Waits until the list has left `Loading`.
    pub async fn settled(&self) -> TravelLogView {
        let mut rx = self.view.subscribe();
        let settled = match rx.wait_for(|view| !view.state.is_loading()).await {
            Ok(view) => view.clone(),
            Err(_) => self.view(),
        };
        settled
    }

    // =========================================================================
    // Filter Inputs
    // =========================================================================

    /// `None` shows every category.
    pub fn set_category_filter(&self, category: Option<String>) {
        self.filter.send_if_modified(|filter| {
            if filter.category == category {
                return false;
            }
            filter.category = category;
            true
        });
    }

    pub fn set_search_query(&self, query: impl Into<String>) {
        let query = query.into();
        self.filter.send_if_modified(|filter| {
            if filter.query == query {
                return false;
            }
            filter.query = query;
            true
        });
    }

    // =========================================================================
    // Actions
    // =========================================================================

    /// Saves an entry with exactly `tag_ids` attached.
    ///
    /// The list itself refreshes through the live query.
    pub async fn save_entry(&self, mut entry: TravelEntry, tag_ids: &[i64]) -> Result<i64, ApiError> {
        entry.touch();
        self.journal
            .save_entry_with_tags(&entry, tag_ids)
            .await
            .map_err(|e| self.fail(e.into()))
    }

    pub async fn delete_entry(&self, entry: &TravelEntry) -> Result<(), ApiError> {
        self.journal
            .delete_entry(entry)
            .await
            .map_err(|e| self.fail(e.into()))
    }

    pub async fn create_tag(&self, name: &str, color: &str) -> Result<i64, ApiError> {
        self.journal
            .create_tag(name, color)
            .await
            .map_err(|e| self.fail(e.into()))
    }

    /// Every tag, by name.
    pub fn live_tags(&self) -> LiveQuery<Vec<TravelTag>> {
        self.journal.live_tags()
    }

    /// Category names currently used by at least one entry.
    pub fn live_categories(&self) -> LiveQuery<Vec<String>> {
        self.journal.live_distinct_categories()
    }

    fn fail(&self, err: ApiError) -> ApiError {
        warn!(error = %err, "Travel log action failed");
        let message = err.message.clone();
        self.view.send_modify(|view| view.state = TravelLogUiState::Error(message));
        err
    }
}

impl Drop for TravelLogModel {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run(
    mut live: LiveQuery<Vec<TravelEntryWithTags>>,
    mut filter_rx: watch::Receiver<EntryFilter>,
    view: Arc<watch::Sender<TravelLogView>>,
) {
    let mut all: Vec<TravelEntryWithTags> = Vec::new();

    loop {
        tokio::select! {
            result = live.next() => match result {
                Some(Ok(entries)) => {
                    all = entries;
                    let filter = filter_rx.borrow().clone();
                    let visible = filter.apply(&all);
                    debug!(total = all.len(), visible = visible.len(), "Travel log refreshed");
                    view.send_modify(|view| {
                        view.state = TravelLogUiState::Success;
                        view.entries = visible;
                        view.filter = filter;
                        view.total = all.len();
                    });
                }
                Some(Err(e)) => {
                    let err = ApiError::from(e);
                    view.send_modify(|view| view.state = TravelLogUiState::Error(err.message));
                }
                None => break,
            },
            changed = filter_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let filter = filter_rx.borrow_and_update().clone();
                let visible = filter.apply(&all);
                view.send_modify(|view| {
                    view.entries = visible;
                    view.filter = filter;
                });
            }
        }
    }
}
