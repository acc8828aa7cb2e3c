//! Typed records stored in the chat collections
//!
//! Field names follow the hosted schema (`createdAt`, `displayName`), so
//! data written by other clients of the same project decodes unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::document::Write;
use crate::error::StoreError;
use crate::identity::AccountId;

/// Default collection holding chat messages
pub const MESSAGES_COLLECTION: &str = "messages";

/// Default collection holding user profiles, keyed by uid
pub const USERS_COLLECTION: &str = "users";

/// Server-timestamped field messages are ordered by
pub const CREATED_AT_FIELD: &str = "createdAt";

/// A chat message as stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    /// Message body
    pub text: String,
    /// Author email
    pub user: AccountId,
    /// Server-assigned creation time
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// A message about to be written; the server assigns `createdAt`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewMessage {
    pub text: String,
    pub user: AccountId,
}

impl NewMessage {
    pub fn new(text: impl Into<String>, user: AccountId) -> Self {
        Self {
            text: text.into(),
            user,
        }
    }

    /// Build the store write, timestamping `order_field` on the server
    pub fn into_write(self, order_field: &str) -> Result<Write, StoreError> {
        Ok(Write::from_record(&self)?.server_timestamp(order_field))
    }
}

/// A user profile: maps an account email to its chosen display name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub email: AccountId,
    #[serde(rename = "displayName", default)]
    pub display_name: String,
}

impl ProfileRecord {
    pub fn new(email: AccountId, display_name: impl Into<String>) -> Self {
        Self {
            email,
            display_name: display_name.into(),
        }
    }
}
