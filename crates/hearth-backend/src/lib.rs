//! # Hearth Backend
//!
//! In-process emulator of the hosted backend-as-a-service the chat client
//! is written against.
//!
//! - [`MemoryIdentityProvider`]: password accounts with the hosted service's
//!   semantics (creating an account signs it in, emails are normalized,
//!   auth state is pushed to every subscriber)
//! - [`MemoryDocumentStore`]: schemaless collections with strictly
//!   increasing server timestamps and live queries that push the complete
//!   ordered result set after every commit
//! - [`Emulator`]: both of the above, optionally seeded from TOML
//!
//! Both implementations support fault injection so failure paths of the
//! client can be exercised deterministically.
//!
//! ## Example
//!
//! ```rust,ignore
//! use hearth_backend::Emulator;
//! use hearth_core::{DocumentStore, IdentityProvider, Query, Write};
//!
//! let emulator = Emulator::new();
//! emulator.identity.create_account("a@x.com", "pw1").await?;
//! emulator.store.add("messages", Write::new().field("text", "hi")).await?;
//!
//! let mut live = emulator.store.live_query(Query::collection("messages"));
//! ```

pub mod identity;
pub mod seed;
pub mod store;

pub use identity::MemoryIdentityProvider;
pub use seed::{Emulator, SeedAccount, SeedData, SeedError};
pub use store::MemoryDocumentStore;
