//! Session subcommands.

use persimmon_client::{SyncEngine, SyncError};
use persimmon_core::SessionToken;

/// Sign in with a session token.
///
/// Replaces the cart from the account and merges the anonymous favorites
/// with the account set.
///
/// # Errors
///
/// Returns an error if an account fetch or the favorites merge fails; the
/// anonymous favorites are preserved in that case and the login can be
/// retried.
#[allow(clippy::print_stdout)]
pub async fn login(engine: &SyncEngine, token: String) -> Result<(), SyncError> {
    engine.login(SessionToken::new(token)).await?;

    println!(
        "signed in: {} cart line(s), {} favorite(s)",
        engine.cart().lines().len(),
        engine.favorites().entries().len()
    );
    Ok(())
}

/// Sign out. Local collections are kept; further mutations are anonymous.
#[allow(clippy::print_stdout)]
pub fn logout(engine: &SyncEngine) {
    engine.logout();
    println!("signed out");
}
