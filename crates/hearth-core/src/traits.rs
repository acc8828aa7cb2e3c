//! Backend traits
//!
//! These traits are the whole contract between the chat client and the
//! hosted backend. The client never assumes anything beyond them:
//!
//! - [`IdentityProvider`]: account creation, password sign-in, sign-out,
//!   and a push stream of auth-state changes
//! - [`DocumentStore`]: writes, one-shot collection reads, and live queries
//!   that push the complete ordered result set on every change

use async_trait::async_trait;

use crate::document::{DocId, Document, Query, Snapshot, Write};
use crate::error::{ProviderError, StoreError};
use crate::identity::AuthUser;
use crate::stream::BoxStream;

/// Stream of auth states: `Some(user)` when signed in, `None` when signed out
pub type AuthStateStream = BoxStream<Option<AuthUser>>;

/// Stream of live-query snapshots
pub type SnapshotStream = BoxStream<Result<Snapshot, StoreError>>;

/// Hosted identity provider
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Verify email/password credentials and sign the account in
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, ProviderError>;

    /// Create a password account
    ///
    /// Like the hosted service, a successful creation also signs the new
    /// account in.
    async fn create_account(&self, email: &str, password: &str)
    -> Result<AuthUser, ProviderError>;

    /// Sign the current session out
    async fn sign_out(&self) -> Result<(), ProviderError>;

    /// The currently signed-in account, if any
    fn current_user(&self) -> Option<AuthUser>;

    /// Subscribe to auth-state changes
    ///
    /// The stream yields the current state immediately, then one item per
    /// change.
    fn auth_state(&self) -> AuthStateStream;
}

/// Hosted document database
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Add a document with a generated id
    async fn add(&self, collection: &str, write: Write) -> Result<DocId, StoreError>;

    /// Create or overwrite the document `id`
    async fn set(&self, collection: &str, id: &DocId, write: Write) -> Result<(), StoreError>;

    /// Read every document of a collection once
    async fn read_all(&self, collection: &str) -> Result<Vec<Document>, StoreError>;

    /// Open a live query
    ///
    /// The stream yields the current result set immediately and again after
    /// every committed change to the collection, always complete and
    /// ordered. An `Err` item ends the subscription.
    fn live_query(&self, query: Query) -> SnapshotStream;
}
