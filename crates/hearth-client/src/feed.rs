//! Live feed renderer
//!
//! Holds one live query over the messages collection, ordered by the
//! server timestamp. Every snapshot carries the complete ordered result
//! set, so each one replaces the rendered list: clear, append one line per
//! message with its author resolved, then scroll to the newest entry.

use std::sync::Arc;

use futures::StreamExt;
use hearth_core::{DocumentStore, MessageRecord, Query, Snapshot};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::names::DisplayNameCache;
use crate::surface::{ChatSurface, FeedLine};

/// Renders the messages collection into a [`ChatSurface`]
#[derive(Clone)]
pub struct LiveFeed {
    store: Arc<dyn DocumentStore>,
    surface: Arc<dyn ChatSurface>,
    config: Arc<ClientConfig>,
    /// Survives feed restarts; only the running render loop locks it
    names: Arc<Mutex<DisplayNameCache>>,
}

impl LiveFeed {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        surface: Arc<dyn ChatSurface>,
        config: Arc<ClientConfig>,
    ) -> Self {
        let names = DisplayNameCache::new(Arc::clone(&store), config.collections.users.clone());
        Self {
            store,
            surface,
            config,
            names: Arc::new(Mutex::new(names)),
        }
    }

    /// The display-name cache used for rendering
    pub fn names(&self) -> Arc<Mutex<DisplayNameCache>> {
        Arc::clone(&self.names)
    }

    /// The live query this feed subscribes to
    pub fn query(&self) -> Query {
        Query::collection(self.config.collections.messages.as_str())
            .order_by(self.config.order_field.as_str())
    }

    /// Open the live query and render every snapshot until cancelled
    pub fn start(&self) -> FeedSubscription {
        let cancel = CancellationToken::new();
        let feed = self.clone();
        let token = cancel.clone();
        let task = tokio::spawn(async move { feed.run(token).await });

        info!(collection = %self.config.collections.messages, "Live feed started");
        FeedSubscription {
            cancel,
            task: Some(task),
        }
    }

    async fn run(self, cancel: CancellationToken) {
        let mut snapshots = self.store.live_query(self.query());

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                next = snapshots.next() => next,
            };

            match next {
                Some(Ok(snapshot)) => {
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => break,
                        _ = self.render(&snapshot) => {}
                    }
                }
                Some(Err(e)) => {
                    warn!(error = %e, "Live feed subscription failed");
                    return;
                }
                None => {
                    debug!("Live feed stream closed");
                    return;
                }
            }
        }

        debug!("Live feed cancelled");
    }

    /// Replace the rendered list with `snapshot`
    pub async fn render(&self, snapshot: &Snapshot) {
        self.surface.clear_messages();

        for doc in &snapshot.docs {
            let message: MessageRecord = match doc.decode() {
                Ok(message) => message,
                Err(e) => {
                    warn!(id = %doc.id, error = %e, "Skipping malformed message");
                    continue;
                }
            };

            let author = if self.config.resolves_names() {
                self.names.lock().await.resolve(&message.user).await
            } else {
                message.user.to_string()
            };

            self.surface.append_message(&FeedLine {
                author,
                text: message.text,
                created_at: message.created_at,
            });
        }

        self.surface.scroll_to_latest();
    }
}

/// Handle to a running feed; dropping it cancels the feed
#[derive(Debug)]
pub struct FeedSubscription {
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl FeedSubscription {
    /// Whether the render loop is still running
    pub fn is_live(&self) -> bool {
        !self.cancel.is_cancelled() && self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Cancel the feed and wait for the render loop to exit
    pub async fn stop(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take()
            && let Err(e) = task.await
        {
            warn!(error = %e, "Live feed task failed");
        }
    }
}

impl Drop for FeedSubscription {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
