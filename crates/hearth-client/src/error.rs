//! Error types for hearth-client
//!
//! The `Display` form of every variant is the exact text shown to the user
//! in an alert.

use hearth_core::{ProviderError, StoreError, Uid};
use thiserror::Error;

/// Errors surfaced by the chat client
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// Form input was rejected before any provider call
    #[error("{0}")]
    Validation(&'static str),

    /// The identity provider rejected or failed the request
    #[error("{0}")]
    Provider(#[from] ProviderError),

    /// The document store rejected or failed the request
    #[error("{0}")]
    Store(#[from] StoreError),

    /// Account creation or the profile write failed during signup
    ///
    /// `orphaned` names the account left behind when creation succeeded
    /// but the profile write did not.
    #[error("Signup failed: {message}")]
    Signup {
        message: String,
        orphaned: Option<Uid>,
    },

    /// An action that needs a signed-in account ran without one
    #[error("You must be logged in to do that.")]
    NotSignedIn,

    /// Invalid client configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
