//! Persimmon CLI - drive the sync engine against a configured account API.
//!
//! # Usage
//!
//! ```bash
//! # Add a variant to the cart (anonymous unless PERSIMMON_SESSION_TOKEN is set)
//! persimmon cart add --product prod-1 --color red --size M --quantity 2
//!
//! # Inspect and edit the cart
//! persimmon cart show
//! persimmon cart update --product prod-1 --color red --size M --quantity 3
//! persimmon cart remove --product prod-1 --color red --size M
//!
//! # Favorites
//! persimmon favorites add prod-1
//! persimmon favorites list
//!
//! # Sign in: replaces the cart from the account and merges favorites
//! persimmon login --token <session-token>
//! persimmon logout
//!
//! # Watch a payment until it resolves (Ctrl+C cancels)
//! persimmon payment watch pay-123
//! ```
//!
//! # Environment Variables
//!
//! - `PERSIMMON_API_URL` - Base URL of the account API (required)
//! - `PERSIMMON_DATA_DIR` - Durable state directory (default: `.persimmon`)
//! - `PERSIMMON_SESSION_TOKEN` - Session token for signed-in operation
//! - `PERSIMMON_POLL_INTERVAL_SECS` - Payment poll interval (default: 10)

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use persimmon_client::{ClientConfig, SyncEngine};

mod commands;

#[derive(Parser)]
#[command(name = "persimmon")]
#[command(author, version, about = "Persimmon storefront sync CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect and mutate the shopping cart
    Cart {
        #[command(subcommand)]
        action: commands::cart::CartAction,
    },
    /// Inspect and mutate the favorites collection
    Favorites {
        #[command(subcommand)]
        action: commands::favorites::FavoritesAction,
    },
    /// Sign in and run the account transitions
    Login {
        /// Session token issued by the account API
        #[arg(short, long)]
        token: String,
    },
    /// Drop the session token; further mutations are anonymous
    Logout,
    /// Payment operations
    Payment {
        #[command(subcommand)]
        action: commands::payment::PaymentAction,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing with EnvFilter; default to info level for our crates
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "persimmon=info".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = ClientConfig::from_env()?;
    let engine = SyncEngine::new(&config)?;
    engine.bootstrap().await?;

    match cli.command {
        Commands::Cart { action } => commands::cart::run(&engine, action),
        Commands::Favorites { action } => commands::favorites::run(&engine, action),
        Commands::Login { token } => commands::session::login(&engine, token).await?,
        Commands::Logout => commands::session::logout(&engine),
        Commands::Payment { action } => commands::payment::run(&engine, action).await,
    }

    // Let fire-and-forget pushes settle before the process exits.
    engine.drain_pending().await;
    Ok(())
}
