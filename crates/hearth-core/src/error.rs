//! Error types for Hearth backends

use thiserror::Error;

/// Errors reported by an identity provider
///
/// The `Display` form is the provider's own human-readable message, which
/// the client shows to the user verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The provider rejected the request (bad credentials, duplicate account...)
    #[error("{message}")]
    Rejected {
        /// Machine-readable code, e.g. `auth/wrong-password`
        code: String,
        /// Human-readable message
        message: String,
    },

    /// The provider could not be reached
    #[error("{0}")]
    Unavailable(String),
}

impl ProviderError {
    /// Create a rejection with a code and message
    pub fn rejected(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Rejected {
            code: code.into(),
            message: message.into(),
        }
    }

    /// The machine-readable code, if the provider supplied one
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Rejected { code, .. } => Some(code),
            Self::Unavailable(_) => None,
        }
    }
}

/// Errors reported by a document store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Missing or insufficient permissions: {0}")]
    PermissionDenied(String),

    #[error("Document store unavailable: {0}")]
    Unavailable(String),

    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Deserialization(e.to_string())
    }
}
