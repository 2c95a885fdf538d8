//! Sync engine: composition root for the client state.
//!
//! Wires the API client, session store, and collection managers together
//! and owns the login/logout transitions. Cheaply cloneable; clones share
//! all underlying state.

use std::sync::Arc;

use persimmon_core::{PaymentId, SessionToken};

use crate::api::StoreApi;
use crate::cart::CartManager;
use crate::config::ClientConfig;
use crate::error::Result;
use crate::favorites::FavoritesManager;
use crate::payment::{self, PollHandle, PollerConfig};
use crate::persist::FavoritesFile;
use crate::session::SessionStore;

/// Client-state engine for one storefront session.
#[derive(Clone)]
pub struct SyncEngine {
    inner: Arc<SyncEngineInner>,
}

struct SyncEngineInner {
    api: StoreApi,
    session: SessionStore,
    cart: CartManager,
    favorites: FavoritesManager,
    poll: PollerConfig,
}

impl SyncEngine {
    /// Create an engine from configuration.
    ///
    /// Rehydrates anonymous favorites from the durable store. If the
    /// configuration carries a pre-provisioned session token, call
    /// [`bootstrap`](Self::bootstrap) afterwards to pull the account state.
    ///
    /// # Errors
    ///
    /// Returns an error if the durable store exists but cannot be read.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let api = StoreApi::new(&config.api_url);
        let session = SessionStore::new(config.session_token.clone());
        let cart = CartManager::new(api.clone(), session.clone());
        let favorites = FavoritesManager::new(
            api.clone(),
            session.clone(),
            FavoritesFile::new(&config.data_dir),
        )?;

        Ok(Self {
            inner: Arc::new(SyncEngineInner {
                api,
                session,
                cart,
                favorites,
                poll: PollerConfig {
                    interval: config.poll_interval,
                    ..PollerConfig::default()
                },
            }),
        })
    }

    /// Get a reference to the account API client.
    #[must_use]
    pub fn api(&self) -> &StoreApi {
        &self.inner.api
    }

    /// Get a reference to the session store.
    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.inner.session
    }

    /// Get a reference to the cart manager.
    #[must_use]
    pub fn cart(&self) -> &CartManager {
        &self.inner.cart
    }

    /// Get a reference to the favorites manager.
    #[must_use]
    pub fn favorites(&self) -> &FavoritesManager {
        &self.inner.favorites
    }

    /// Run the account flows for a token already present at startup.
    ///
    /// No-op in anonymous mode.
    ///
    /// # Errors
    ///
    /// Returns an error if an account fetch or the favorites merge fails;
    /// both flows are idempotent and safe to retry.
    pub async fn bootstrap(&self) -> Result<()> {
        if let Some(token) = self.inner.session.token() {
            self.run_login_flows(&token).await?;
        }
        Ok(())
    }

    /// Sign in: install the token and run the one-shot account transitions.
    ///
    /// The cart is **replaced** wholesale from the account (anonymous cart
    /// contents are discarded, not merged); the favorites are merged as the
    /// union of the anonymous and account sets.
    ///
    /// # Errors
    ///
    /// Returns an error if an account fetch or the favorites merge fails.
    /// The token stays installed and the anonymous favorites copy is
    /// preserved, so the flows can be retried by calling
    /// [`bootstrap`](Self::bootstrap).
    pub async fn login(&self, token: SessionToken) -> Result<()> {
        self.inner.session.set(token.clone());
        self.run_login_flows(&token).await
    }

    /// Sign out: drop the token. Local collections are kept as-is; further
    /// mutations are anonymous again.
    pub fn logout(&self) {
        self.inner.session.clear();
        tracing::info!("session token cleared");
    }

    /// Start polling a payment until it reaches a terminal state.
    ///
    /// A successful payment clears the cart. Stop the poll via
    /// [`PollHandle::stop`] when the observing view goes away.
    #[must_use]
    pub fn watch_payment(&self, payment: PaymentId) -> PollHandle {
        self.watch_payment_with(payment, self.inner.poll.clone())
    }

    /// Start polling a payment with explicit poller tuning.
    #[must_use]
    pub fn watch_payment_with(&self, payment: PaymentId, config: PollerConfig) -> PollHandle {
        payment::spawn_poller(
            self.inner.api.clone(),
            self.inner.session.token(),
            self.inner.cart.clone(),
            payment,
            config,
        )
    }

    /// Wait for all in-flight fire-and-forget pushes to settle.
    pub async fn drain_pending(&self) {
        self.inner.cart.drain_pending().await;
        self.inner.favorites.drain_pending().await;
    }

    async fn run_login_flows(&self, token: &SessionToken) -> Result<()> {
        self.inner.cart.replace_from_account(token).await?;
        self.inner.favorites.merge_on_login(token).await?;
        Ok(())
    }
}
