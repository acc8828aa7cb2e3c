//! Message composer
//!
//! Sending is optimistic: the input is cleared as soon as the write is
//! queued, and the live feed shows the message once the store commits it.
//! Queued writes are committed one at a time in send order.

use std::sync::{Arc, OnceLock};

use hearth_core::{DocId, DocumentStore, IdentityProvider, NewMessage, StoreError, Write};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// A queued message write
struct Outgoing {
    collection: String,
    write: Write,
    done: oneshot::Sender<Result<DocId, StoreError>>,
}

/// A message write that has been handed to the store
#[derive(Debug)]
pub struct PendingWrite {
    done: oneshot::Receiver<Result<DocId, StoreError>>,
}

impl PendingWrite {
    /// Wait for the store to confirm or reject the write
    pub async fn confirmed(self) -> ClientResult<DocId> {
        match self.done.await {
            Ok(result) => result.map_err(ClientError::from),
            Err(_) => Err(StoreError::Unavailable("message writer stopped".to_string()).into()),
        }
    }
}

/// Writes chat messages as the signed-in account
pub struct MessageComposer {
    identity: Arc<dyn IdentityProvider>,
    store: Arc<dyn DocumentStore>,
    config: Arc<ClientConfig>,
    /// Started on first send
    writer: OnceLock<mpsc::UnboundedSender<Outgoing>>,
}

impl MessageComposer {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        store: Arc<dyn DocumentStore>,
        config: Arc<ClientConfig>,
    ) -> Self {
        Self {
            identity,
            store,
            config,
            writer: OnceLock::new(),
        }
    }

    /// Send the contents of `input` and clear it
    ///
    /// Whitespace-only input is ignored and left untouched (`Ok(None)`).
    /// Otherwise the trimmed text is queued as a message from the current
    /// account and `input` is cleared before the write completes. Without
    /// a signed-in account nothing is written and `input` is kept.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn send(&self, input: &mut String) -> ClientResult<Option<PendingWrite>> {
        let text = input.trim();
        if text.is_empty() {
            return Ok(None);
        }

        let user = self.identity.current_user().ok_or(ClientError::NotSignedIn)?;
        let write = NewMessage::new(text, user.email).into_write(&self.config.order_field)?;

        let (done, pending) = oneshot::channel();
        let outgoing = Outgoing {
            collection: self.config.collections.messages.clone(),
            write,
            done,
        };
        self.writer()
            .send(outgoing)
            .map_err(|_| StoreError::Unavailable("message writer stopped".to_string()))?;

        input.clear();
        Ok(Some(PendingWrite { done: pending }))
    }

    fn writer(&self) -> &mpsc::UnboundedSender<Outgoing> {
        self.writer.get_or_init(|| {
            let (tx, rx) = mpsc::unbounded_channel();
            tokio::spawn(write_loop(Arc::clone(&self.store), rx));
            tx
        })
    }
}

/// Commit queued writes in order until the composer is dropped
async fn write_loop(store: Arc<dyn DocumentStore>, mut rx: mpsc::UnboundedReceiver<Outgoing>) {
    while let Some(Outgoing {
        collection,
        write,
        done,
    }) = rx.recv().await
    {
        let result = store.add(&collection, write).await;
        match &result {
            Ok(id) => debug!(collection = %collection, id = %id, "Message written"),
            Err(e) => warn!(collection = %collection, error = %e, "Message write failed"),
        }
        // The sender may not be waiting for confirmation
        let _ = done.send(result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hearth_backend::{MemoryDocumentStore, MemoryIdentityProvider};
    use hearth_core::MessageRecord;

    async fn signed_in() -> (MessageComposer, MemoryDocumentStore) {
        let identity = Arc::new(MemoryIdentityProvider::new());
        identity.create_account("a@x.com", "pw1").await.unwrap();
        let store = MemoryDocumentStore::new();
        let composer = MessageComposer::new(
            identity,
            Arc::new(store.clone()),
            Arc::new(ClientConfig::default()),
        );
        (composer, store)
    }

    #[tokio::test]
    async fn test_blank_input_writes_nothing() {
        let (composer, store) = signed_in().await;

        for blank in ["", "   ", "\n\t"] {
            let mut input = blank.to_string();
            assert!(composer.send(&mut input).unwrap().is_none());
            assert_eq!(input, blank);
        }
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_send_writes_trimmed_text_as_current_user() {
        let (composer, store) = signed_in().await;

        let mut input = "  hello  ".to_string();
        let pending = composer.send(&mut input).unwrap().unwrap();
        assert!(input.is_empty());

        let id = pending.confirmed().await.unwrap();
        let doc = store.get("messages", &id).unwrap();
        let record: MessageRecord = doc.decode().unwrap();
        assert_eq!(record.text, "hello");
        assert_eq!(record.user.as_str(), "a@x.com");
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn test_input_cleared_even_when_write_fails() {
        let (composer, store) = signed_in().await;
        store.fail_writes("messages", Some(StoreError::PermissionDenied("messages".into())));

        let mut input = "hi".to_string();
        let pending = composer.send(&mut input).unwrap().unwrap();
        assert!(input.is_empty());

        assert!(matches!(
            pending.confirmed().await,
            Err(ClientError::Store(StoreError::PermissionDenied(_)))
        ));
        assert!(store.documents("messages").is_empty());
    }

    #[tokio::test]
    async fn test_writes_commit_in_send_order() {
        let (composer, store) = signed_in().await;

        let pending: Vec<_> = ["one", "two", "three"]
            .into_iter()
            .map(|text| composer.send(&mut text.to_string()).unwrap().unwrap())
            .collect();
        for write in pending {
            write.confirmed().await.unwrap();
        }

        let texts: Vec<String> = store
            .documents("messages")
            .iter()
            .map(|d| d.decode::<MessageRecord>().unwrap().text)
            .collect();
        assert_eq!(texts, ["one", "two", "three"]);
    }

    #[tokio::test]
    async fn test_signed_out_send_keeps_input() {
        let composer = MessageComposer::new(
            Arc::new(MemoryIdentityProvider::new()),
            Arc::new(MemoryDocumentStore::new()),
            Arc::new(ClientConfig::default()),
        );

        let mut input = "hi".to_string();
        assert_eq!(composer.send(&mut input).unwrap_err(), ClientError::NotSignedIn);
        assert_eq!(input, "hi");
    }
}
