//! # Hearth Client
//!
//! The chat client proper, written against the backend traits in
//! `hearth-core` and a [`ChatSurface`] it renders into.
//!
//! ## Components
//!
//! - [`SessionGate`]: follows auth state, swaps regions, owns the live feed
//! - [`CredentialActions`]: login, signup, logout
//! - [`DisplayNameCache`]: email to display-name lookups over the profiles
//! - [`LiveFeed`]: renders every snapshot of the ordered message query
//! - [`MessageComposer`]: optimistic message sends
//! - [`ChatClient`]: all of the above behind one handle
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use hearth_backend::Emulator;
//! use hearth_client::{ChatClient, ClientConfig, CredentialForm, RecordingSurface};
//!
//! let emulator = Emulator::new();
//! let surface = Arc::new(RecordingSurface::new());
//! let client = ChatClient::new(
//!     emulator.identity.clone(),
//!     Arc::new(emulator.store.clone()),
//!     surface.clone(),
//!     ClientConfig::default(),
//! );
//! client.start();
//!
//! client.toggle_form_mode();
//! let mut form = CredentialForm::new("a@x.com", "pw1").with_display_name("Ann");
//! client.submit(&mut form).await?;
//!
//! let mut input = String::from("hi");
//! client.send(&mut input)?;
//! ```

pub mod client;
pub mod composer;
pub mod config;
pub mod credentials;
pub mod error;
pub mod feed;
pub mod names;
pub mod session;
pub mod surface;

pub use client::ChatClient;
pub use composer::{MessageComposer, PendingWrite};
pub use config::{ClientConfig, Collections, Variant};
pub use credentials::{
    CredentialActions, CredentialForm, MISSING_CREDENTIALS, MISSING_SIGNUP_FIELDS,
    SIGNUP_SUCCEEDED,
};
pub use error::{ClientError, ClientResult};
pub use feed::{FeedSubscription, LiveFeed};
pub use names::DisplayNameCache;
pub use session::SessionGate;
pub use surface::{
    ChatSurface, FeedLine, FormLayout, FormMode, RecordingSurface, Region, SurfaceState,
};
