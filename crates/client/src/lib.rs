//! Persimmon Client - cart/favorites sync engine and payment poller.
//!
//! This crate owns the client-side state of a headless storefront and keeps
//! it consistent with a remote account API:
//!
//! - [`CartManager`] - authoritative cart collection; optimistic local
//!   mutation, best-effort remote persistence, wholesale replacement from
//!   the account on login
//! - [`FavoritesManager`] - authoritative favorites set; durable anonymous
//!   persistence and a one-shot merge with the account set on login
//! - [`PollHandle`] - payment-status polling to a terminal state
//! - [`SyncEngine`] - composition root wiring config, API client, session
//!   store, and the managers together
//!
//! # Consistency model
//!
//! Local state is the source of truth for the current session. Mutations
//! apply synchronously, publish a read-only mirror, and then issue a
//! fire-and-forget remote call when a session token is present. Remote
//! failures are logged and swallowed; the next mutation's own remote call is
//! the only retry mechanism. The remote store is eventually, not strictly,
//! consistent with the local one.
//!
//! Mutation methods spawn their remote pushes on the ambient Tokio runtime
//! and must be called from within one.
//!
//! # Example
//!
//! ```rust,ignore
//! use persimmon_client::{ClientConfig, SyncEngine};
//! use persimmon_core::{CartLine, ProductId, Quantity, VariantKey};
//!
//! let config = ClientConfig::from_env()?;
//! let engine = SyncEngine::new(&config)?;
//!
//! engine.cart().add(CartLine::new(
//!     ProductId::new("prod-1"),
//!     VariantKey::new("red", "M"),
//!     Quantity::new(1),
//! ));
//!
//! // Sign in: replaces the cart from the account, merges favorites.
//! engine.login(token).await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod config;
pub mod engine;
pub mod error;
pub mod favorites;
pub mod payment;
pub mod persist;
pub mod session;
pub mod store;

pub use api::{ApiError, StoreApi};
pub use cart::CartManager;
pub use config::{ClientConfig, ConfigError};
pub use engine::SyncEngine;
pub use error::{Result, SyncError};
pub use favorites::{FavoritesManager, union_by_id};
pub use payment::{PaymentState, PollHandle, PollerConfig};
pub use persist::{FavoritesFile, StorageError};
pub use session::SessionStore;
pub use store::{Mirror, MirrorReader};
