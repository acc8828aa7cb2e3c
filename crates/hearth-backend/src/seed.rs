//! Emulator bundle and seed data
//!
//! Seed files are TOML:
//!
//! ```toml
//! [[accounts]]
//! email = "ann@example.com"
//! password = "pw1"
//! display_name = "Ann"
//! ```

use std::sync::Arc;

use hearth_core::{DocId, DocumentStore, ProfileRecord, ProviderError, StoreError, Write};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::identity::MemoryIdentityProvider;
use crate::store::MemoryDocumentStore;

/// Errors raised while seeding the emulator
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("seed account {email}: {source}")]
    Account {
        email: String,
        #[source]
        source: ProviderError,
    },

    #[error("seed profile {email}: {source}")]
    Profile {
        email: String,
        #[source]
        source: StoreError,
    },
}

/// One pre-registered account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedAccount {
    pub email: String,
    pub password: String,
    /// Profile display name; no profile document is written when absent
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Initial emulator contents
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub accounts: Vec<SeedAccount>,
}

/// An identity provider and document store sharing one process
#[derive(Debug, Clone)]
pub struct Emulator {
    pub identity: Arc<MemoryIdentityProvider>,
    pub store: MemoryDocumentStore,
}

impl Default for Emulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Emulator {
    /// Empty emulator
    pub fn new() -> Self {
        Self {
            identity: Arc::new(MemoryIdentityProvider::new()),
            store: MemoryDocumentStore::new(),
        }
    }

    /// Register the seed accounts and write their profiles to
    /// `users_collection`. No account is left signed in.
    pub async fn seed(&self, seed: &SeedData, users_collection: &str) -> Result<(), SeedError> {
        for account in &seed.accounts {
            let user = self
                .identity
                .register(&account.email, &account.password)
                .map_err(|source| SeedError::Account {
                    email: account.email.clone(),
                    source,
                })?;

            if let Some(name) = &account.display_name {
                let profile = ProfileRecord::new(user.email.clone(), name.as_str());
                let write = Write::from_record(&profile).map_err(|source| SeedError::Profile {
                    email: account.email.clone(),
                    source,
                })?;
                self.store
                    .set(users_collection, &DocId::new(user.uid.as_str()), write)
                    .await
                    .map_err(|source| SeedError::Profile {
                        email: account.email.clone(),
                        source,
                    })?;
            }
        }

        info!(accounts = seed.accounts.len(), "Emulator seeded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hearth_core::{IdentityProvider, USERS_COLLECTION};

    #[tokio::test]
    async fn test_seed_from_toml() {
        let seed: SeedData = toml::from_str(
            r#"
            [[accounts]]
            email = "ann@example.com"
            password = "pw1"
            display_name = "Ann"

            [[accounts]]
            email = "bob@example.com"
            password = "pw2"
            "#,
        )
        .unwrap();

        let emulator = Emulator::new();
        emulator.seed(&seed, USERS_COLLECTION).await.unwrap();

        assert_eq!(emulator.identity.account_count(), 2);
        assert!(emulator.identity.current_user().is_none());

        let profiles = emulator.store.documents(USERS_COLLECTION);
        assert_eq!(profiles.len(), 1);
        let profile: ProfileRecord = profiles[0].decode().unwrap();
        assert_eq!(profile.display_name, "Ann");

        let ann = emulator.identity.account("ann@example.com").unwrap();
        assert_eq!(profiles[0].id.as_str(), ann.uid.as_str());
    }

    #[tokio::test]
    async fn test_seed_duplicate_account_fails() {
        let seed = SeedData {
            accounts: vec![
                SeedAccount {
                    email: "a@x.com".into(),
                    password: "pw".into(),
                    display_name: None,
                },
                SeedAccount {
                    email: "A@x.com".into(),
                    password: "pw".into(),
                    display_name: None,
                },
            ],
        };

        let err = Emulator::new().seed(&seed, USERS_COLLECTION).await.unwrap_err();
        assert!(matches!(err, SeedError::Account { .. }));
    }
}
