//! Cart collection manager.
//!
//! Holds the authoritative list of cart lines for the current browsing
//! session. Mutations apply locally first (optimistic), publish the
//! read-only mirror, and then - only when a session token is present -
//! issue a fire-and-forget remote call. A failed remote call is logged and
//! swallowed; local state is never rolled back.
//!
//! On login the cart is **replaced** wholesale from the account. Anonymous
//! cart contents are not merged - an intentional asymmetry with the
//! favorites flow.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use persimmon_core::{CartLine, ProductId, Quantity, SessionToken, VariantKey};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::api::StoreApi;
use crate::error::Result;
use crate::session::SessionStore;
use crate::store::{Mirror, MirrorReader};

/// A remote cart mutation to replay against the account.
enum CartPush {
    Add(CartLine),
    Remove(ProductId, VariantKey),
    Update(CartLine),
}

impl CartPush {
    const fn name(&self) -> &'static str {
        match self {
            Self::Add(_) => "add",
            Self::Remove(..) => "remove",
            Self::Update(_) => "update",
        }
    }
}

/// Authoritative owner of the cart collection.
///
/// Cheaply cloneable; all clones share the same underlying state.
#[derive(Clone)]
pub struct CartManager {
    inner: Arc<CartManagerInner>,
}

struct CartManagerInner {
    lines: Mutex<Vec<CartLine>>,
    mirror: Mirror<Vec<CartLine>>,
    pending: Mutex<Vec<JoinHandle<()>>>,
    api: StoreApi,
    session: SessionStore,
}

impl CartManager {
    /// Create an empty cart manager.
    #[must_use]
    pub fn new(api: StoreApi, session: SessionStore) -> Self {
        Self {
            inner: Arc::new(CartManagerInner {
                lines: Mutex::new(Vec::new()),
                mirror: Mirror::new(Vec::new()),
                pending: Mutex::new(Vec::new()),
                api,
                session,
            }),
        }
    }

    /// Add a line to the cart.
    ///
    /// If a line with the same `(product, color, size)` key already exists,
    /// the quantities are summed into the existing line - at most one line
    /// per key ever survives.
    pub fn add(&self, line: CartLine) {
        let snapshot = {
            let mut lines = self.lock_lines();
            match lines
                .iter_mut()
                .find(|l| l.matches(&line.product, &line.variant))
            {
                Some(existing) => {
                    existing.quantity = existing.quantity.saturating_add(line.quantity);
                }
                None => lines.push(line.clone()),
            }
            lines.clone()
        };

        tracing::debug!(product = %line.product, quantity = %line.quantity, "cart line added");
        self.inner.mirror.publish(snapshot);
        self.push_remote(CartPush::Add(line));
    }

    /// Remove the line matching the given key. No-op if absent.
    pub fn remove(&self, product: &ProductId, variant: &VariantKey) {
        let removed;
        let snapshot = {
            let mut lines = self.lock_lines();
            let before = lines.len();
            lines.retain(|l| !l.matches(product, variant));
            removed = lines.len() != before;
            lines.clone()
        };

        if !removed {
            return;
        }

        tracing::debug!(product = %product, "cart line removed");
        self.inner.mirror.publish(snapshot);
        self.push_remote(CartPush::Remove(product.clone(), variant.clone()));
    }

    /// Replace the quantity of the matching line. No-op if absent.
    ///
    /// Values below 1 are clamped to 1 - decrementing past the bottom leaves
    /// the line at quantity 1 rather than storing zero.
    pub fn update_quantity(&self, product: &ProductId, variant: &VariantKey, quantity: u32) {
        let quantity = Quantity::new(quantity);
        let updated;
        let snapshot = {
            let mut lines = self.lock_lines();
            match lines.iter_mut().find(|l| l.matches(product, variant)) {
                Some(line) => {
                    line.quantity = quantity;
                    updated = Some(line.clone());
                }
                None => updated = None,
            }
            lines.clone()
        };

        let Some(line) = updated else { return };

        tracing::debug!(product = %product, quantity = %quantity, "cart quantity updated");
        self.inner.mirror.publish(snapshot);
        self.push_remote(CartPush::Update(line));
    }

    /// Empty the cart, local-only.
    ///
    /// Used after a completed purchase; the remote cart is emptied by the
    /// server during checkout, so no remote call is issued.
    pub fn clear(&self) {
        {
            let mut lines = self.lock_lines();
            lines.clear();
        }
        tracing::debug!("cart cleared");
        self.inner.mirror.publish(Vec::new());
    }

    /// Snapshot of the current cart lines.
    #[must_use]
    pub fn lines(&self) -> Vec<CartLine> {
        self.lock_lines().clone()
    }

    /// Total unit count across all lines.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.lock_lines()
            .iter()
            .map(|l| u64::from(l.quantity.get()))
            .sum()
    }

    /// Read-only mirror of the cart collection.
    #[must_use]
    pub fn watch(&self) -> MirrorReader<Vec<CartLine>> {
        self.inner.mirror.watch()
    }

    /// Replace local state with the account's cart.
    ///
    /// Called on login: the server is authoritative, anonymous contents are
    /// discarded rather than merged.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote fetch fails; local state is left
    /// untouched in that case.
    pub(crate) async fn replace_from_account(&self, token: &SessionToken) -> Result<()> {
        let remote = self.inner.api.fetch_cart(token).await?;

        let snapshot = {
            let mut lines = self.lock_lines();
            *lines = remote;
            lines.clone()
        };

        tracing::info!(count = snapshot.len(), "cart replaced from account");
        self.inner.mirror.publish(snapshot);
        Ok(())
    }

    /// Wait for all in-flight remote pushes to settle.
    ///
    /// Push outcomes stay fire-and-forget (failures are logged, not
    /// returned); this only lets short-lived callers such as the CLI avoid
    /// exiting with work still in flight.
    pub async fn drain_pending(&self) {
        let handles: Vec<JoinHandle<()>> = {
            let mut pending = self.lock_pending();
            pending.drain(..).collect()
        };
        for handle in handles {
            let _ = handle.await;
        }
    }

    /// Spawn a fire-and-forget remote push if a session token is present.
    fn push_remote(&self, push: CartPush) {
        let Some(token) = self.inner.session.token() else {
            return;
        };

        let api = self.inner.api.clone();
        let sync_id = Uuid::new_v4();
        let op = push.name();
        tracing::debug!(%sync_id, op, "dispatching cart sync");

        let handle = tokio::spawn(async move {
            let result = match push {
                CartPush::Add(line) => api.add_cart_line(&token, &line).await,
                CartPush::Remove(product, variant) => {
                    api.remove_cart_line(&token, &product, &variant).await
                }
                CartPush::Update(line) => api.update_cart_line(&token, &line).await,
            };

            match result {
                Ok(()) => tracing::debug!(%sync_id, op, "cart sync confirmed"),
                Err(e) => {
                    tracing::warn!(%sync_id, op, error = %e, "cart sync failed; local state retained");
                }
            }
        });

        let mut pending = self.lock_pending();
        pending.retain(|h| !h.is_finished());
        pending.push(handle);
    }

    fn lock_lines(&self) -> MutexGuard<'_, Vec<CartLine>> {
        self.inner.lines.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_pending(&self) -> MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.inner
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn anonymous_manager() -> CartManager {
        let url = url::Url::parse("http://localhost:9").unwrap();
        CartManager::new(StoreApi::new(&url), SessionStore::default())
    }

    fn line(product: &str, color: &str, size: &str, quantity: u32) -> CartLine {
        CartLine::new(
            ProductId::new(product),
            VariantKey::new(color, size),
            Quantity::new(quantity),
        )
    }

    #[test]
    fn test_add_twice_sums_quantities_into_one_line() {
        let cart = anonymous_manager();
        cart.add(line("A", "red", "M", 1));
        cart.add(line("A", "red", "M", 1));

        let lines = cart.lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines.first().unwrap().quantity.get(), 2);
    }

    #[test]
    fn test_distinct_variants_get_distinct_lines() {
        let cart = anonymous_manager();
        cart.add(line("A", "red", "M", 1));
        cart.add(line("A", "red", "L", 1));
        cart.add(line("A", "blue", "M", 1));

        assert_eq!(cart.lines().len(), 3);
    }

    #[test]
    fn test_at_most_one_line_per_key_after_mixed_ops() {
        let cart = anonymous_manager();
        let product = ProductId::new("A");
        let variant = VariantKey::new("red", "M");

        cart.add(line("A", "red", "M", 2));
        cart.update_quantity(&product, &variant, 5);
        cart.add(line("A", "red", "M", 1));
        cart.remove(&product, &variant);
        cart.add(line("A", "red", "M", 4));

        let lines = cart.lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines.first().unwrap().quantity.get(), 4);
    }

    #[test]
    fn test_update_quantity_clamps_to_one() {
        let cart = anonymous_manager();
        let product = ProductId::new("A");
        let variant = VariantKey::new("red", "M");

        cart.add(line("A", "red", "M", 3));
        cart.update_quantity(&product, &variant, 0);

        assert_eq!(cart.lines().first().unwrap().quantity, Quantity::MIN);
    }

    #[test]
    fn test_update_quantity_missing_key_is_noop() {
        let cart = anonymous_manager();
        cart.add(line("A", "red", "M", 1));
        cart.update_quantity(&ProductId::new("B"), &VariantKey::new("red", "M"), 5);

        assert_eq!(cart.lines().first().unwrap().quantity.get(), 1);
    }

    #[test]
    fn test_remove_missing_key_is_noop() {
        let cart = anonymous_manager();
        cart.add(line("A", "red", "M", 1));
        cart.remove(&ProductId::new("B"), &VariantKey::new("red", "M"));

        assert_eq!(cart.lines().len(), 1);
    }

    #[test]
    fn test_clear_empties_regardless_of_contents() {
        let cart = anonymous_manager();
        cart.add(line("A", "red", "M", 2));
        cart.add(line("B", "blue", "S", 1));

        cart.clear();
        assert!(cart.lines().is_empty());
        assert_eq!(cart.total_quantity(), 0);
    }

    #[test]
    fn test_mirror_tracks_mutations() {
        let cart = anonymous_manager();
        let reader = cart.watch();

        cart.add(line("A", "red", "M", 2));
        assert_eq!(reader.current().len(), 1);

        cart.clear();
        assert!(reader.current().is_empty());
    }
}
