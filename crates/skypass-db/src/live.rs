//! # Live Queries
//!
//! Store queries that re-deliver their result whenever the rows they depend
//! on change.
//!
//! ## How It Works
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Live Query Flow                                  │
//! │                                                                         │
//! │  Repository write (committed)                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ChangeNotifier::notify(&[Table::Entries, Table::EntryTags])           │
//! │       │  (tokio broadcast, one message per committed write)            │
//! │       ▼                                                                 │
//! │  ┌───────────────────────────────┐   ┌───────────────────────────────┐ │
//! │  │ live query task A             │   │ live query task B             │ │
//! │  │ depends on [Entries]          │   │ depends on [Categories]       │ │
//! │  │ → re-run query, push result   │   │ → not affected, keep waiting  │ │
//! │  └──────────────┬────────────────┘   └───────────────────────────────┘ │
//! │                 │ mpsc (unbounded, issue order)                        │
//! │                 ▼                                                       │
//! │  LiveQuery<T> held by a state holder ── dropped → task aborted         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Contract
//! - The first item is the current result, produced right after subscribing.
//! - Every later item follows a committed change to one of the query's tables,
//!   in the order the changes were issued.
//! - Failures are delivered as `Err` items; the subscription stays alive.
//! - Dropping the [`LiveQuery`] tears the subscription down.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio_stream::Stream;
use tracing::{debug, warn};

use crate::error::{DbError, DbResult};

/// Buffer for pending change notifications per subscriber.
const DEFAULT_CAPACITY: usize = 256;

// =============================================================================
// Tables
// =============================================================================

/// Tables a live query can depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Entries,
    Tags,
    Categories,
    EntryTags,
}

// =============================================================================
// Change Notifier
// =============================================================================

/// Fan-out of "these tables changed" messages.
///
/// Repositories call [`notify`](ChangeNotifier::notify) after a write has been
/// committed; live queries subscribe to it.
#[derive(Debug, Clone)]
pub struct ChangeNotifier {
    sender: broadcast::Sender<Vec<Table>>,
}

impl ChangeNotifier {
    /// Creates a notifier with a specific channel capacity.
    ///
    /// A subscriber that falls more than `capacity` messages behind observes
    /// a lag and simply re-runs its query.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        ChangeNotifier { sender }
    }

    /// Publishes a committed change to every live query.
    pub fn notify(&self, tables: &[Table]) {
        // A send error only means no live query is subscribed.
        let _ = self.sender.send(tables.to_vec());
    }

    /// Subscribes to change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<Vec<Table>> {
        self.sender.subscribe()
    }

    /// Number of live subscriptions (for diagnostics).
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// =============================================================================
// Live Query
// =============================================================================

/// A subscription to a query result that changes over time.
///
/// ## Usage
/// ```rust,ignore
/// let mut entries = db.entries().live_all();
///
/// // Current value
/// let first = entries.next().await;
///
/// // Next change
/// let second = entries.next().await;
/// ```
#[derive(Debug)]
pub struct LiveQuery<T> {
    results: mpsc::UnboundedReceiver<DbResult<T>>,
    task: JoinHandle<()>,
}

impl<T: Send + 'static> LiveQuery<T> {
    /// Starts a live query.
    ///
    /// `query` runs once immediately and again after every notification that
    /// touches one of `tables`. Must be called from within a Tokio runtime.
    pub fn spawn<F, Fut>(notifier: &ChangeNotifier, tables: &'static [Table], query: F) -> Self
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = DbResult<T>> + Send + 'static,
    {
        // Subscribe before the first run so no change can slip in between.
        let mut changes = notifier.subscribe();
        let (sender, results) = mpsc::unbounded_channel();

        let task = tokio::spawn(async move {
            if sender.send(query().await).is_err() {
                return;
            }

            loop {
                match changes.recv().await {
                    Ok(touched) => {
                        if !touched.iter().any(|table| tables.contains(table)) {
                            continue;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, ?tables, "Live query lagged, re-running");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }

                if sender.send(query().await).is_err() {
                    break;
                }
            }

            debug!(?tables, "Live query finished");
        });

        LiveQuery { results, task }
    }
}

impl<T> LiveQuery<T> {
    /// Waits for the next result.
    ///
    /// Returns `None` once the store has shut down.
    pub async fn next(&mut self) -> Option<DbResult<T>> {
        self.results.recv().await
    }

    /// Takes the current result and ends the subscription.
    pub async fn first(mut self) -> DbResult<T> {
        match self.next().await {
            Some(result) => result,
            None => Err(DbError::Internal(
                "live query ended before producing a result".to_string(),
            )),
        }
    }
}

impl<T> Stream for LiveQuery<T> {
    type Item = DbResult<T>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().results.poll_recv(cx)
    }
}

impl<T> Drop for LiveQuery<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::timeout;
    use tokio_stream::StreamExt;

    fn counting_query(
        notifier: &ChangeNotifier,
        tables: &'static [Table],
    ) -> (LiveQuery<usize>, Arc<AtomicUsize>) {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = runs.clone();
        let live = LiveQuery::spawn(notifier, tables, move || {
            let counter = counter.clone();
            async move { Ok(counter.fetch_add(1, Ordering::SeqCst) + 1) }
        });
        (live, runs)
    }

    #[tokio::test]
    async fn test_delivers_current_value_on_subscribe() {
        let notifier = ChangeNotifier::default();
        let (mut live, _) = counting_query(&notifier, &[Table::Entries]);

        assert_eq!(live.next().await.unwrap().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_reruns_on_relevant_change_in_order() {
        let notifier = ChangeNotifier::default();
        let (mut live, _) = counting_query(&notifier, &[Table::Entries, Table::EntryTags]);
        assert_eq!(live.next().await.unwrap().unwrap(), 1);

        notifier.notify(&[Table::Entries]);
        notifier.notify(&[Table::EntryTags]);

        assert_eq!(live.next().await.unwrap().unwrap(), 2);
        assert_eq!(live.next().await.unwrap().unwrap(), 3);
    }

    #[tokio::test]
    async fn test_ignores_unrelated_tables() {
        let notifier = ChangeNotifier::default();
        let (mut live, runs) = counting_query(&notifier, &[Table::Categories]);
        assert_eq!(live.next().await.unwrap().unwrap(), 1);

        notifier.notify(&[Table::Entries, Table::Tags]);

        let pending = timeout(Duration::from_millis(50), live.next()).await;
        assert!(pending.is_err(), "no re-run expected");
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_errors_are_delivered_and_subscription_survives() {
        let notifier = ChangeNotifier::default();
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = runs.clone();
        let mut live = LiveQuery::spawn(&notifier, &[Table::Tags], move || {
            let counter = counter.clone();
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(DbError::QueryFailed("disk I/O error".to_string()))
                } else {
                    Ok(())
                }
            }
        });

        assert!(live.next().await.unwrap().is_err());
        notifier.notify(&[Table::Tags]);
        assert!(live.next().await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_drop_tears_down_subscription() {
        let notifier = ChangeNotifier::default();
        let (mut live, _) = counting_query(&notifier, &[Table::Entries]);
        live.next().await.unwrap().unwrap();
        assert_eq!(notifier.subscriber_count(), 1);

        drop(live);
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(notifier.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_stream_interface() {
        let notifier = ChangeNotifier::default();
        let (live, _) = counting_query(&notifier, &[Table::Entries]);
        let mut stream = live.map(|result| result.map(|n| n * 10));

        assert_eq!(stream.next().await.unwrap().unwrap(), 10);
        notifier.notify(&[Table::Entries]);
        assert_eq!(stream.next().await.unwrap().unwrap(), 20);
    }

    #[tokio::test]
    async fn test_first_ends_subscription() {
        let notifier = ChangeNotifier::default();
        let (live, _) = counting_query(&notifier, &[Table::Entries]);
        assert_eq!(live.first().await.unwrap(), 1);
    }
}
