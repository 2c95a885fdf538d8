//! Persimmon Core - Shared types library.
//!
//! This crate provides common types used across all Persimmon components:
//! - `client` - Cart/favorites sync engine and payment poller
//! - `cli` - Command-line driver for the sync engine
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no
//! filesystem access. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, quantities, session tokens, and
//!   payment statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
