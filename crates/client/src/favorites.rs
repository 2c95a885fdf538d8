//! Favorites collection manager.
//!
//! Holds the authoritative set of favorited product ids. Unlike the cart,
//! favorites survive the anonymous-to-authenticated transition: while no
//! session token is present the whole collection is mirrored to the durable
//! store on every change, and on login the anonymous set is merged with the
//! account's set (union by product id) rather than discarded.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use persimmon_core::{FavoriteEntry, ProductId, SessionToken};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::api::StoreApi;
use crate::error::Result;
use crate::persist::FavoritesFile;
use crate::session::SessionStore;
use crate::store::{Mirror, MirrorReader};

/// A remote favorites mutation to replay against the account.
enum FavoritePush {
    Add(FavoriteEntry),
    Remove(FavoriteEntry),
}

impl FavoritePush {
    const fn name(&self) -> &'static str {
        match self {
            Self::Add(_) => "add",
            Self::Remove(_) => "remove",
        }
    }
}

/// Union of two favorite collections by product id.
///
/// Local entries keep their order and come first; remote entries the local
/// set lacks follow in their own order. An id present in both appears once.
/// This is the reconciliation step of the login-time merge, kept pure so it
/// can be tested apart from the I/O around it.
#[must_use]
pub fn union_by_id(local: &[FavoriteEntry], remote: &[FavoriteEntry]) -> Vec<FavoriteEntry> {
    let mut merged: Vec<FavoriteEntry> = Vec::with_capacity(local.len() + remote.len());
    for entry in local.iter().chain(remote) {
        if !merged.iter().any(|e| e.product == entry.product) {
            merged.push(entry.clone());
        }
    }
    merged
}

/// Authoritative owner of the favorites collection.
///
/// Cheaply cloneable; all clones share the same underlying state.
#[derive(Clone)]
pub struct FavoritesManager {
    inner: Arc<FavoritesManagerInner>,
}

struct FavoritesManagerInner {
    entries: Mutex<Vec<FavoriteEntry>>,
    mirror: Mirror<Vec<FavoriteEntry>>,
    pending: Mutex<Vec<JoinHandle<()>>>,
    api: StoreApi,
    session: SessionStore,
    file: FavoritesFile,
}

impl FavoritesManager {
    /// Create a favorites manager, rehydrating from the durable store when
    /// no session token is present.
    ///
    /// # Errors
    ///
    /// Returns an error if the durable store exists but cannot be read.
    pub fn new(api: StoreApi, session: SessionStore, file: FavoritesFile) -> Result<Self> {
        let entries = if session.is_signed_in() {
            // The account set is fetched by the login flow; the durable copy
            // belongs to anonymous mode only.
            Vec::new()
        } else {
            file.load()?
        };

        if !entries.is_empty() {
            tracing::debug!(count = entries.len(), "favorites rehydrated from durable store");
        }

        Ok(Self {
            inner: Arc::new(FavoritesManagerInner {
                mirror: Mirror::new(entries.clone()),
                entries: Mutex::new(entries),
                pending: Mutex::new(Vec::new()),
                api,
                session,
                file,
            }),
        })
    }

    /// Mark a product as favorite. No-op if already present (set semantics).
    pub fn add(&self, product: ProductId) {
        let entry = FavoriteEntry::new(product);
        let snapshot = {
            let mut entries = self.lock_entries();
            if entries.iter().any(|e| e.product == entry.product) {
                return;
            }
            entries.push(entry.clone());
            entries.clone()
        };

        tracing::debug!(product = %entry.product, "favorite added");
        self.after_change(snapshot);
        self.push_remote(FavoritePush::Add(entry));
    }

    /// Unmark a product as favorite. No-op if absent.
    pub fn remove(&self, product: &ProductId) {
        let removed;
        let snapshot = {
            let mut entries = self.lock_entries();
            let before = entries.len();
            entries.retain(|e| &e.product != product);
            removed = entries.len() != before;
            entries.clone()
        };

        if !removed {
            return;
        }

        tracing::debug!(product = %product, "favorite removed");
        self.after_change(snapshot);
        self.push_remote(FavoritePush::Remove(FavoriteEntry::new(product.clone())));
    }

    /// Whether the product is currently favorited.
    #[must_use]
    pub fn is_favorite(&self, product: &ProductId) -> bool {
        self.lock_entries().iter().any(|e| &e.product == product)
    }

    /// Snapshot of the current favorites.
    #[must_use]
    pub fn entries(&self) -> Vec<FavoriteEntry> {
        self.lock_entries().clone()
    }

    /// Read-only mirror of the favorites collection.
    #[must_use]
    pub fn watch(&self) -> MirrorReader<Vec<FavoriteEntry>> {
        self.inner.mirror.watch()
    }

    /// Merge the anonymous favorites with the account's set.
    ///
    /// Reads the durable anonymous copy, fetches the remote set, pushes the
    /// union as the new authoritative remote state, clears the durable copy,
    /// and re-fetches the server-confirmed set into memory. Triggered once
    /// per login transition; idempotent - re-running with no intervening
    /// local changes neither duplicates nor loses entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote fetch or push fails. The durable
    /// anonymous copy is preserved in that case so no data is lost and the
    /// merge can be retried.
    pub(crate) async fn merge_on_login(&self, token: &SessionToken) -> Result<()> {
        let local = self.inner.file.load()?;
        let remote = self.inner.api.fetch_favorites(token).await?;
        let merged = union_by_id(&local, &remote);

        self.inner.api.sync_favorites(token, &merged).await?;

        // The account now owns the data; the anonymous copy is spent.
        self.inner.file.clear()?;

        // Prefer the server-confirmed set; fall back to the union we just
        // pushed if the confirming fetch fails (the data is safe remotely).
        let confirmed = match self.inner.api.fetch_favorites(token).await {
            Ok(confirmed) => confirmed,
            Err(e) => {
                tracing::warn!(error = %e, "confirming favorites fetch failed; using pushed union");
                merged
            }
        };

        let snapshot = {
            let mut entries = self.lock_entries();
            *entries = confirmed;
            entries.clone()
        };

        tracing::info!(count = snapshot.len(), "favorites merged with account");
        self.inner.mirror.publish(snapshot);
        Ok(())
    }

    /// Wait for all in-flight remote pushes to settle.
    pub async fn drain_pending(&self) {
        let handles: Vec<JoinHandle<()>> = {
            let mut pending = self.lock_pending();
            pending.drain(..).collect()
        };
        for handle in handles {
            let _ = handle.await;
        }
    }

    /// Publish the mirror and, in anonymous mode, persist the collection.
    fn after_change(&self, snapshot: Vec<FavoriteEntry>) {
        if !self.inner.session.is_signed_in()
            && let Err(e) = self.inner.file.save(&snapshot)
        {
            tracing::warn!(error = %e, "failed to persist anonymous favorites");
        }
        self.inner.mirror.publish(snapshot);
    }

    /// Spawn a fire-and-forget remote push if a session token is present.
    fn push_remote(&self, push: FavoritePush) {
        let Some(token) = self.inner.session.token() else {
            return;
        };

        let api = self.inner.api.clone();
        let sync_id = Uuid::new_v4();
        let op = push.name();
        tracing::debug!(%sync_id, op, "dispatching favorites sync");

        let handle = tokio::spawn(async move {
            let result = match push {
                FavoritePush::Add(entry) => api.add_favorite(&token, &entry).await,
                FavoritePush::Remove(entry) => api.remove_favorite(&token, &entry).await,
            };

            match result {
                Ok(()) => tracing::debug!(%sync_id, op, "favorites sync confirmed"),
                Err(e) => {
                    tracing::warn!(%sync_id, op, error = %e, "favorites sync failed; local state retained");
                }
            }
        });

        let mut pending = self.lock_pending();
        pending.retain(|h| !h.is_finished());
        pending.push(handle);
    }

    fn lock_entries(&self) -> MutexGuard<'_, Vec<FavoriteEntry>> {
        self.inner
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_pending(&self) -> MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.inner
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
