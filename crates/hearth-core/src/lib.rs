//! # Hearth Core
//!
//! Core types, traits, and errors shared by every Hearth crate.
//!
//! The chat client never talks to a concrete backend. It is written against
//! two traits describing the hosted backend-as-a-service it relies on:
//!
//! - [`IdentityProvider`]: password accounts, sign-in/out, auth-state pushes
//! - [`DocumentStore`]: schemaless collections, one-shot reads, live queries
//!
//! ## Key Types
//!
//! - [`AccountId`]: an account's email address, the author key of messages
//! - [`Uid`]: the provider-assigned account identifier (profile document key)
//! - [`Document`], [`Write`], [`Query`], [`Snapshot`]: the document model
//! - [`MessageRecord`], [`ProfileRecord`]: typed views of stored documents

pub mod document;
pub mod error;
pub mod identity;
pub mod records;
pub mod stream;
pub mod traits;

// Re-export main types
pub use document::*;
pub use error::*;
pub use identity::*;
pub use records::*;
pub use traits::*;
