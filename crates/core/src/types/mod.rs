//! Core types for Persimmon.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod favorite;
pub mod id;
pub mod quantity;
pub mod status;
pub mod token;

pub use cart::{CartLine, VariantKey};
pub use favorite::FavoriteEntry;
pub use id::*;
pub use quantity::Quantity;
pub use status::PaymentStatus;
pub use token::SessionToken;
