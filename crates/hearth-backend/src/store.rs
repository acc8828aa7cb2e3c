//! In-memory document store
//!
//! Collections are kept in insertion order. Every committed write is
//! announced on a broadcast channel; live queries re-evaluate their query
//! on each announcement for their collection and push the full result set.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use hearth_core::{DocId, Document, DocumentStore, Query, Snapshot, SnapshotStream, StoreError, Write};
use tokio::sync::broadcast;
use tracing::{debug, trace};

/// Shared state behind a [`MemoryDocumentStore`] handle
#[derive(Debug)]
struct StoreInner {
    /// Documents per collection, in insertion order
    collections: RwLock<HashMap<String, Vec<Document>>>,
    /// Commit announcements (collection name)
    changes: broadcast::Sender<String>,
    /// Last commit timestamp handed out
    last_commit: Mutex<Option<DateTime<Utc>>>,
    /// Injected write failures per collection
    write_faults: DashMap<String, StoreError>,
    /// Injected read failures per collection
    read_faults: DashMap<String, StoreError>,
    /// One-shot reads per collection
    reads: DashMap<String, usize>,
    /// Committed writes across all collections
    writes: AtomicUsize,
}

/// In-memory implementation of [`DocumentStore`]
///
/// Cloning yields another handle to the same data.
#[derive(Debug, Clone)]
pub struct MemoryDocumentStore {
    inner: Arc<StoreInner>,
}

impl Default for MemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocumentStore {
    /// Create an empty store
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(1024);
        Self {
            inner: Arc::new(StoreInner {
                collections: RwLock::new(HashMap::new()),
                changes,
                last_commit: Mutex::new(None),
                write_faults: DashMap::new(),
                read_faults: DashMap::new(),
                reads: DashMap::new(),
                writes: AtomicUsize::new(0),
            }),
        }
    }

    /// Make every write to `collection` fail with `error` (None clears it)
    pub fn fail_writes(&self, collection: &str, error: Option<StoreError>) {
        match error {
            Some(e) => {
                self.inner.write_faults.insert(collection.to_string(), e);
            }
            None => {
                self.inner.write_faults.remove(collection);
            }
        }
    }

    /// Make every one-shot read of `collection` fail with `error` (None clears it)
    pub fn fail_reads(&self, collection: &str, error: Option<StoreError>) {
        match error {
            Some(e) => {
                self.inner.read_faults.insert(collection.to_string(), e);
            }
            None => {
                self.inner.read_faults.remove(collection);
            }
        }
    }

    /// Number of one-shot reads issued against `collection`
    pub fn read_count(&self, collection: &str) -> usize {
        self.inner.reads.get(collection).map(|n| *n).unwrap_or(0)
    }

    /// Number of committed writes
    pub fn write_count(&self) -> usize {
        self.inner.writes.load(Ordering::SeqCst)
    }

    /// Number of open live queries
    pub fn listener_count(&self) -> usize {
        self.inner.changes.receiver_count()
    }

    /// Documents currently in `collection`, in insertion order
    pub fn documents(&self, collection: &str) -> Vec<Document> {
        self.inner
            .collections
            .read()
            .map(|c| c.get(collection).cloned().unwrap_or_default())
            .unwrap_or_default()
    }

    /// Get one document
    pub fn get(&self, collection: &str, id: &DocId) -> Option<Document> {
        self.documents(collection).into_iter().find(|d| &d.id == id)
    }

    fn check_write(&self, collection: &str) -> Result<(), StoreError> {
        match self.inner.write_faults.get(collection) {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }

    /// Next server timestamp: wall clock, bumped to stay strictly increasing
    fn commit_time(&self) -> Result<DateTime<Utc>, StoreError> {
        let mut last = self
            .inner
            .last_commit
            .lock()
            .map_err(|_| StoreError::Unavailable("commit clock poisoned".to_string()))?;
        let now = Utc::now();
        let ts = match *last {
            Some(prev) if now <= prev => prev + Duration::nanoseconds(1),
            _ => now,
        };
        *last = Some(ts);
        Ok(ts)
    }

    fn commit(
        &self,
        collection: &str,
        id: DocId,
        write: Write,
        replace: bool,
    ) -> Result<(), StoreError> {
        {
            let mut collections = self.inner.collections.write().map_err(|_| {
                StoreError::Unavailable("failed to acquire write lock".to_string())
            })?;
            // Stamped under the lock so commit order matches timestamp order
            let fields = write.commit(self.commit_time()?);
            let docs = collections.entry(collection.to_string()).or_default();
            let existing = docs.iter().position(|d| d.id == id).filter(|_| replace);
            match existing {
                Some(index) => docs[index].fields = fields,
                None => docs.push(Document::new(id.clone(), fields)),
            }
        }

        self.inner.writes.fetch_add(1, Ordering::SeqCst);
        trace!(collection, id = %id, "Committed document");
        let _ = self.inner.changes.send(collection.to_string());
        Ok(())
    }
}

impl StoreInner {
    fn snapshot(&self, query: &Query) -> Result<Snapshot, StoreError> {
        let docs = self
            .collections
            .read()
            .map_err(|_| StoreError::Unavailable("failed to acquire read lock".to_string()))?
            .get(&query.collection)
            .cloned()
            .unwrap_or_default();
        Ok(Snapshot::new(query.apply(docs)))
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn add(&self, collection: &str, write: Write) -> Result<DocId, StoreError> {
        self.check_write(collection)?;
        let id = DocId::generate();
        self.commit(collection, id.clone(), write, false)?;
        Ok(id)
    }

    async fn set(&self, collection: &str, id: &DocId, write: Write) -> Result<(), StoreError> {
        self.check_write(collection)?;
        self.commit(collection, id.clone(), write, true)
    }

    async fn read_all(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        *self.inner.reads.entry(collection.to_string()).or_insert(0) += 1;
        if let Some(e) = self.inner.read_faults.get(collection) {
            return Err(e.clone());
        }
        Ok(self.documents(collection))
    }

    fn live_query(&self, query: Query) -> SnapshotStream {
        // Subscribe before the first read so no commit slips between them
        let mut rx = self.inner.changes.subscribe();
        let inner = Arc::clone(&self.inner);
        debug!(collection = %query.collection, "Live query opened");

        Box::pin(async_stream::stream! {
            match inner.snapshot(&query) {
                Ok(snapshot) => yield Ok(snapshot),
                Err(e) => {
                    yield Err(e);
                    return;
                }
            }

            loop {
                match rx.recv().await {
                    Ok(collection) if collection != query.collection => continue,
                    // A lagged listener re-reads; the snapshot is complete either way
                    Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {
                        match inner.snapshot(&query) {
                            Ok(snapshot) => yield Ok(snapshot),
                            Err(e) => {
                                yield Err(e);
                                return;
                            }
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use serde_json::json;

    #[tokio::test]
    async fn test_add_assigns_increasing_timestamps() {
        let store = MemoryDocumentStore::new();
        for text in ["a", "b", "c"] {
            store
                .add("messages", Write::new().field("text", text).server_timestamp("createdAt"))
                .await
                .unwrap();
        }

        let docs = store.documents("messages");
        let stamps: Vec<_> = docs
            .iter()
            .map(|d| d.get("createdAt").and_then(|v| v.as_str()).unwrap().to_string())
            .collect();
        assert_eq!(stamps.len(), 3);
        assert!(stamps[0] < stamps[1] && stamps[1] < stamps[2]);
        assert_eq!(store.write_count(), 3);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_adds_commit_in_timestamp_order() {
        let store = MemoryDocumentStore::new();
        let writers: Vec<_> = (0..64)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .add("messages", Write::new().field("n", i).server_timestamp("createdAt"))
                        .await
                })
            })
            .collect();
        for writer in writers {
            writer.await.unwrap().unwrap();
        }

        let stamps: Vec<String> = store
            .documents("messages")
            .iter()
            .map(|d| d.get("createdAt").and_then(|v| v.as_str()).unwrap().to_string())
            .collect();
        let mut sorted = stamps.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(stamps.len(), 64);
        assert_eq!(stamps, sorted);
    }

    #[tokio::test]
    async fn test_set_replaces_document() {
        let store = MemoryDocumentStore::new();
        let id = DocId::new("uid-1");
        store.set("users", &id, Write::new().field("displayName", "Ann")).await.unwrap();
        store.set("users", &id, Write::new().field("displayName", "Anna")).await.unwrap();

        let docs = store.documents("users");
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].get("displayName"), Some(&json!("Anna")));
    }

    #[tokio::test]
    async fn test_faults_and_counters() {
        let store = MemoryDocumentStore::new();
        store.fail_writes("users", Some(StoreError::PermissionDenied("users".into())));
        store.fail_reads("users", Some(StoreError::Unavailable("offline".into())));

        assert!(store.set("users", &DocId::new("u"), Write::new()).await.is_err());
        assert!(store.read_all("users").await.is_err());
        assert_eq!(store.read_count("users"), 1);
        assert_eq!(store.write_count(), 0);

        store.fail_writes("users", None);
        store.fail_reads("users", None);
        store.set("users", &DocId::new("u"), Write::new()).await.unwrap();
        assert_eq!(store.read_all("users").await.unwrap().len(), 1);
        assert_eq!(store.read_count("users"), 2);
    }

    #[tokio::test]
    async fn test_live_query_pushes_full_ordered_snapshots() {
        let store = MemoryDocumentStore::new();
        let mut live = store.live_query(Query::collection("messages").order_by("createdAt"));

        let first = live.next().await.unwrap().unwrap();
        assert!(first.is_empty());
        assert_eq!(store.listener_count(), 1);

        store
            .add("messages", Write::new().field("text", "hi").server_timestamp("createdAt"))
            .await
            .unwrap();
        store.add("other", Write::new().field("text", "ignored")).await.unwrap();
        store
            .add("messages", Write::new().field("text", "there").server_timestamp("createdAt"))
            .await
            .unwrap();

        let second = live.next().await.unwrap().unwrap();
        assert!(!second.is_empty());

        // Wait until the snapshot reflects both writes
        let mut latest = second;
        while latest.len() < 2 {
            latest = live.next().await.unwrap().unwrap();
        }
        let texts: Vec<_> = latest
            .docs
            .iter()
            .map(|d| d.get("text").and_then(|v| v.as_str()).unwrap())
            .collect();
        assert_eq!(texts, ["hi", "there"]);

        drop(live);
        assert_eq!(store.listener_count(), 0);
    }
}
