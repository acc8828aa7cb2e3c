//! Client configuration
//!
//! ```toml
//! variant = "named"
//! order_field = "createdAt"
//!
//! [collections]
//! messages = "messages"
//! users = "users"
//! ```

use std::path::Path;

use hearth_core::{CREATED_AT_FIELD, MESSAGES_COLLECTION, USERS_COLLECTION};
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, ClientResult};

/// Which flavor of the client to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Signup collects a display name; senders render by display name
    #[default]
    Named,
    /// Signup is email/password only; senders render as raw email
    Plain,
}

/// Collection names in the document store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Collections {
    pub messages: String,
    pub users: String,
}

impl Default for Collections {
    fn default() -> Self {
        Self {
            messages: MESSAGES_COLLECTION.to_string(),
            users: USERS_COLLECTION.to_string(),
        }
    }
}

/// Configuration for a [`ChatClient`](crate::ChatClient)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub variant: Variant,
    pub collections: Collections,
    /// Server-timestamped field the feed is ordered by
    pub order_field: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            variant: Variant::Named,
            collections: Collections::default(),
            order_field: CREATED_AT_FIELD.to_string(),
        }
    }
}

impl ClientConfig {
    /// Default configuration for the plain variant
    pub fn plain() -> Self {
        Self {
            variant: Variant::Plain,
            ..Default::default()
        }
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(s: &str) -> ClientResult<Self> {
        let config: Self = toml::from_str(s).map_err(|e| ClientError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> ClientResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ClientError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&contents)
    }

    /// Reject empty collection or field names
    pub fn validate(&self) -> ClientResult<()> {
        let names = [
            ("collections.messages", &self.collections.messages),
            ("collections.users", &self.collections.users),
            ("order_field", &self.order_field),
        ];
        for (key, value) in names {
            if value.trim().is_empty() {
                return Err(ClientError::Config(format!("{key} must not be empty")));
            }
        }
        Ok(())
    }

    /// Whether senders are resolved through the profile collection
    pub fn resolves_names(&self) -> bool {
        self.variant == Variant::Named
    }
}
