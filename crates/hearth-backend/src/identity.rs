//! In-memory identity provider
//!
//! Accounts live in a `DashMap` keyed by normalized (lowercased, trimmed)
//! email. The signed-in account is held in a `watch` channel so every
//! auth-state subscriber sees the latest state.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use hearth_core::stream::watch_to_stream;
use hearth_core::{AccountId, AuthStateStream, AuthUser, IdentityProvider, ProviderError, Uid};
use tokio::sync::watch;
use tracing::{debug, info};

/// Stored credential record
#[derive(Debug, Clone)]
struct StoredAccount {
    uid: Uid,
    email: AccountId,
    password: String,
}

/// In-memory implementation of [`IdentityProvider`]
#[derive(Debug)]
pub struct MemoryIdentityProvider {
    /// Accounts by normalized email
    accounts: DashMap<String, StoredAccount>,
    /// Currently signed-in account
    state: watch::Sender<Option<AuthUser>>,
    /// Minimum accepted password length (0 = no policy)
    min_password_len: usize,
    /// Simulate a network outage
    unavailable: AtomicBool,
    /// Number of sign-in / create-account requests received
    requests: AtomicUsize,
}

impl Default for MemoryIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryIdentityProvider {
    /// Create a provider with no accounts and no password policy
    pub fn new() -> Self {
        let (state, _) = watch::channel(None);
        Self {
            accounts: DashMap::new(),
            state,
            min_password_len: 0,
            unavailable: AtomicBool::new(false),
            requests: AtomicUsize::new(0),
        }
    }

    /// Reject passwords shorter than `len` on account creation
    pub fn with_min_password_len(mut self, len: usize) -> Self {
        self.min_password_len = len;
        self
    }

    /// Simulate the provider being unreachable
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of sign-in and create-account requests received so far
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Number of registered accounts
    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    /// Look up an account by email
    pub fn account(&self, email: &str) -> Option<AuthUser> {
        self.accounts
            .get(&normalize(email))
            .map(|a| AuthUser::new(a.uid.clone(), a.email.clone()))
    }

    /// Register an account without signing it in
    pub fn register(&self, email: &str, password: &str) -> Result<AuthUser, ProviderError> {
        let key = normalize(email);
        if !is_valid_email(&key) {
            return Err(ProviderError::rejected(
                "auth/invalid-email",
                "The email address is badly formatted.",
            ));
        }
        if password.is_empty() {
            return Err(ProviderError::rejected(
                "auth/missing-password",
                "A password is required.",
            ));
        }
        if password.chars().count() < self.min_password_len {
            return Err(ProviderError::rejected(
                "auth/weak-password",
                format!(
                    "Password should be at least {} characters.",
                    self.min_password_len
                ),
            ));
        }

        match self.accounts.entry(key.clone()) {
            Entry::Occupied(_) => Err(ProviderError::rejected(
                "auth/email-already-in-use",
                "The email address is already in use by another account.",
            )),
            Entry::Vacant(slot) => {
                let account = StoredAccount {
                    uid: Uid::generate(),
                    email: AccountId::new(key),
                    password: password.to_string(),
                };
                let user = AuthUser::new(account.uid.clone(), account.email.clone());
                slot.insert(account);
                info!(uid = %user.uid, email = %user.email, "Account registered");
                Ok(user)
            }
        }
    }

    fn begin_request(&self) -> Result<(), ProviderError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(ProviderError::Unavailable(
                "A network error has occurred.".to_string(),
            ));
        }
        Ok(())
    }

    fn set_signed_in(&self, user: Option<AuthUser>) {
        self.state.send_replace(user);
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentityProvider {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, ProviderError> {
        self.begin_request()?;

        let user = self
            .accounts
            .get(&normalize(email))
            .filter(|a| a.password == password)
            .map(|a| AuthUser::new(a.uid.clone(), a.email.clone()))
            .ok_or_else(|| {
                ProviderError::rejected(
                    "auth/invalid-credential",
                    "The supplied auth credential is incorrect, malformed or has expired.",
                )
            })?;

        debug!(uid = %user.uid, "Signed in");
        self.set_signed_in(Some(user.clone()));
        Ok(user)
    }

    async fn create_account(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthUser, ProviderError> {
        self.begin_request()?;
        let user = self.register(email, password)?;
        self.set_signed_in(Some(user.clone()));
        Ok(user)
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        if let Some(user) = self.state.borrow().as_ref() {
            debug!(uid = %user.uid, "Signed out");
        }
        self.set_signed_in(None);
        Ok(())
    }

    fn current_user(&self) -> Option<AuthUser> {
        self.state.borrow().clone()
    }

    fn auth_state(&self) -> AuthStateStream {
        watch_to_stream(self.state.subscribe())
    }
}

fn normalize(email: &str) -> String {
    email.trim().to_lowercase()
}

fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace)
}
