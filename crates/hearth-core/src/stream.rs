//! Stream utilities for backend push channels.
//!
//! Providers push auth-state changes through tokio channels; this exposes
//! them as boxed `Stream`s.

use std::pin::Pin;

use futures::Stream;
use tokio::sync::watch;

/// A boxed, sendable stream
pub type BoxStream<T> = Pin<Box<dyn Stream<Item = T> + Send>>;

/// Convert a watch receiver into a Stream that yields the current value
/// first and then every subsequent change.
pub fn watch_to_stream<T: Clone + Send + Sync + 'static>(mut rx: watch::Receiver<T>) -> BoxStream<T> {
    Box::pin(async_stream::stream! {
        let current = rx.borrow_and_update().clone();
        yield current;
        while rx.changed().await.is_ok() {
            let next = rx.borrow_and_update().clone();
            yield next;
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn test_watch_to_stream_replays_current_value() {
        let (tx, rx) = watch::channel(Some("a"));
        let mut stream = watch_to_stream(rx);

        assert_eq!(stream.next().await, Some(Some("a")));

        tx.send(None).unwrap();
        assert_eq!(stream.next().await, Some(None));

        drop(tx);
        assert_eq!(stream.next().await, None);
    }
}
