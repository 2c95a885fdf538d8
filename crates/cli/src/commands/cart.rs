//! Cart subcommands.

use clap::Subcommand;
use persimmon_client::SyncEngine;
use persimmon_core::{CartLine, ProductId, Quantity, VariantKey};

/// Cart operations.
#[derive(Subcommand)]
pub enum CartAction {
    /// Add a variant to the cart
    Add {
        /// Product identifier
        #[arg(short, long)]
        product: String,

        /// Variant color
        #[arg(long)]
        color: String,

        /// Variant size
        #[arg(long)]
        size: String,

        /// Units to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Remove a variant from the cart
    Remove {
        /// Product identifier
        #[arg(short, long)]
        product: String,

        /// Variant color
        #[arg(long)]
        color: String,

        /// Variant size
        #[arg(long)]
        size: String,
    },
    /// Set the quantity of a variant already in the cart
    Update {
        /// Product identifier
        #[arg(short, long)]
        product: String,

        /// Variant color
        #[arg(long)]
        color: String,

        /// Variant size
        #[arg(long)]
        size: String,

        /// New quantity (floored at 1)
        #[arg(short, long)]
        quantity: u32,
    },
    /// Print the current cart
    Show,
    /// Empty the cart locally
    Clear,
}

/// Execute a cart subcommand.
pub fn run(engine: &SyncEngine, action: CartAction) {
    let cart = engine.cart();
    match action {
        CartAction::Add {
            product,
            color,
            size,
            quantity,
        } => {
            cart.add(CartLine::new(
                ProductId::new(product),
                VariantKey::new(color, size),
                Quantity::new(quantity),
            ));
        }
        CartAction::Remove {
            product,
            color,
            size,
        } => {
            cart.remove(&ProductId::new(product), &VariantKey::new(color, size));
        }
        CartAction::Update {
            product,
            color,
            size,
            quantity,
        } => {
            cart.update_quantity(
                &ProductId::new(product),
                &VariantKey::new(color, size),
                quantity,
            );
        }
        CartAction::Show => show(engine),
        CartAction::Clear => cart.clear(),
    }
}

/// Print the cart snapshot from the read-only mirror.
#[allow(clippy::print_stdout)]
fn show(engine: &SyncEngine) {
    let lines = engine.cart().watch().current();
    if lines.is_empty() {
        println!("cart is empty");
        return;
    }

    for line in &lines {
        println!(
            "{} ({} / {}) x{}",
            line.product, line.variant.color, line.variant.size, line.quantity
        );
    }
    println!("total units: {}", engine.cart().total_quantity());
}
