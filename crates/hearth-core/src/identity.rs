//! Account identities
//!
//! Two identifiers travel through the system:
//!
//! - [`AccountId`]: the account's email. Messages are authored by it and the
//!   display-name cache is keyed by it.
//! - [`Uid`]: the opaque identifier the identity provider assigns. Profile
//!   documents are stored under it.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// An account identifier: the (unique) email address of the account
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    /// Create an account identifier from an email address
    pub fn new(email: impl Into<String>) -> Self {
        Self(email.into())
    }

    /// The email as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the underlying string
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for AccountId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Provider-assigned account identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Uid(String);

impl Uid {
    pub fn new(uid: impl Into<String>) -> Self {
        Self(uid.into())
    }

    /// Generate a random uid (28 alphanumeric characters)
    pub fn generate() -> Self {
        let raw = uuid::Uuid::new_v4().simple().to_string();
        Self(raw[..28].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Uid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The currently authenticated account, as reported by the identity provider
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AuthUser {
    /// Provider-assigned identifier
    pub uid: Uid,
    /// Account email
    pub email: AccountId,
}

impl AuthUser {
    pub fn new(uid: Uid, email: AccountId) -> Self {
        Self { uid, email }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_id_display() {
        let id = AccountId::new("a@x.com");
        assert_eq!(id.to_string(), "a@x.com");
        assert_eq!(id.as_str(), "a@x.com");
    }

    #[test]
    fn test_account_id_serializes_as_plain_string() {
        let id = AccountId::from("a@x.com");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"a@x.com\"");
    }

    #[test]
    fn test_uid_generate_is_unique() {
        let a = Uid::generate();
        let b = Uid::generate();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 28);
    }
}
