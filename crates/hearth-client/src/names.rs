//! Display-name cache
//!
//! Maps author emails to the display names stored in the profile
//! collection. Entries never expire. A miss triggers one full scan of the
//! profile collection, which caches every profile it finds.

use std::collections::HashMap;
use std::sync::Arc;

use hearth_core::{AccountId, DocumentStore, ProfileRecord, StoreError};
use tracing::{debug, warn};

/// Lazily populated email to display-name map
pub struct DisplayNameCache {
    store: Arc<dyn DocumentStore>,
    collection: String,
    entries: HashMap<String, String>,
    scans: usize,
}

impl DisplayNameCache {
    /// Create an empty cache over the profiles in `collection`
    pub fn new(store: Arc<dyn DocumentStore>, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
            entries: HashMap::new(),
            scans: 0,
        }
    }

    /// Display name for `email`, falling back to the email itself
    ///
    /// There is no negative caching: an email without a profile rescans on
    /// every call.
    pub async fn resolve(&mut self, email: &AccountId) -> String {
        if let Some(name) = self.get(email) {
            return name.to_string();
        }

        if let Err(e) = self.scan().await {
            warn!(collection = %self.collection, error = %e, "Profile scan failed");
        }

        self.get(email)
            .map(str::to_string)
            .unwrap_or_else(|| email.to_string())
    }

    /// Cached, non-empty display name for `email`
    pub fn get(&self, email: &AccountId) -> Option<&str> {
        self.entries
            .get(email.as_str())
            .map(String::as_str)
            .filter(|name| !name.is_empty())
    }

    /// Number of profile scans issued
    pub fn scan_count(&self) -> usize {
        self.scans
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Read the whole profile collection and cache every profile
    async fn scan(&mut self) -> Result<(), StoreError> {
        self.scans += 1;
        let docs = self.store.read_all(&self.collection).await?;

        for doc in &docs {
            match doc.decode::<ProfileRecord>() {
                Ok(profile) => {
                    self.entries
                        .insert(profile.email.into_inner(), profile.display_name);
                }
                Err(e) => debug!(id = %doc.id, error = %e, "Skipping malformed profile"),
            }
        }

        debug!(profiles = docs.len(), cached = self.entries.len(), "Profile scan complete");
        Ok(())
    }
}
