//! Session gate
//!
//! Follows the identity provider's auth-state stream. Signing in shows the
//! chat region and starts the live feed; signing out shows the login
//! region and cancels it.

use std::sync::{Arc, Mutex, MutexGuard};

use futures::StreamExt;
use hearth_core::{AuthStateStream, AuthUser};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::feed::{FeedSubscription, LiveFeed};
use crate::surface::{ChatSurface, Region};

/// Switches the UI between the login and chat regions
pub struct SessionGate {
    surface: Arc<dyn ChatSurface>,
    feed: LiveFeed,
    /// Held while the feed is live
    subscription: Mutex<Option<FeedSubscription>>,
}

impl SessionGate {
    pub fn new(surface: Arc<dyn ChatSurface>, feed: LiveFeed) -> Self {
        Self {
            surface,
            feed,
            subscription: Mutex::new(None),
        }
    }

    fn subscription(&self) -> MutexGuard<'_, Option<FeedSubscription>> {
        self.subscription
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Whether the live feed is running
    pub fn is_feed_live(&self) -> bool {
        self.subscription().as_ref().is_some_and(FeedSubscription::is_live)
    }

    /// React to one auth-state change
    ///
    /// Must be called from within a Tokio runtime.
    pub fn handle_auth_change(&self, user: Option<&AuthUser>) {
        match user {
            Some(user) => {
                self.surface.show_region(Region::Chat);
                let mut subscription = self.subscription();
                if subscription.as_ref().is_some_and(FeedSubscription::is_live) {
                    debug!(uid = %user.uid, "Feed already live");
                    return;
                }
                info!(uid = %user.uid, "Session started");
                *subscription = Some(self.feed.start());
            }
            None => {
                self.surface.show_region(Region::Login);
                // Dropping the handle cancels the feed
                if self.subscription().take().is_some() {
                    info!("Session ended");
                }
            }
        }
    }

    /// Apply every state from `states` until it ends or `cancel` fires
    pub async fn run(&self, mut states: AuthStateStream, cancel: CancellationToken) {
        loop {
            let state = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                state = states.next() => state,
            };
            match state {
                Some(user) => self.handle_auth_change(user.as_ref()),
                None => break,
            }
        }

        self.subscription().take();
        debug!("Session gate stopped");
    }
}
