//! Favorites subcommands.

use clap::Subcommand;
use persimmon_client::SyncEngine;
use persimmon_core::ProductId;

/// Favorites operations.
#[derive(Subcommand)]
pub enum FavoritesAction {
    /// Mark a product as favorite
    Add {
        /// Product identifier
        product: String,
    },
    /// Unmark a product as favorite
    Remove {
        /// Product identifier
        product: String,
    },
    /// Print the current favorites
    List,
}

/// Execute a favorites subcommand.
pub fn run(engine: &SyncEngine, action: FavoritesAction) {
    let favorites = engine.favorites();
    match action {
        FavoritesAction::Add { product } => favorites.add(ProductId::new(product)),
        FavoritesAction::Remove { product } => favorites.remove(&ProductId::new(product)),
        FavoritesAction::List => list(engine),
    }
}

/// Print the favorites snapshot from the read-only mirror.
#[allow(clippy::print_stdout)]
fn list(engine: &SyncEngine) {
    let entries = engine.favorites().watch().current();
    if entries.is_empty() {
        println!("no favorites");
        return;
    }

    for entry in &entries {
        println!("{}", entry.product);
    }
}
