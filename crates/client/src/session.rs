//! Session token store.
//!
//! Holds the current session token, if any. Its presence gates whether the
//! managers persist mutations remotely; the login/logout *transitions*
//! (cart replacement, favorites merge) are orchestrated by
//! [`SyncEngine`](crate::engine::SyncEngine), not here.

use std::sync::{Arc, Mutex, PoisonError};

use persimmon_core::SessionToken;

/// Shared holder of the current session token.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    token: Arc<Mutex<Option<SessionToken>>>,
}

impl SessionStore {
    /// Create an anonymous (token-less) store.
    #[must_use]
    pub fn new(token: Option<SessionToken>) -> Self {
        Self {
            token: Arc::new(Mutex::new(token)),
        }
    }

    /// Snapshot of the current token.
    #[must_use]
    pub fn token(&self) -> Option<SessionToken> {
        self.lock().clone()
    }

    /// Whether a session token is currently present.
    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.lock().is_some()
    }

    /// Install a token (login, or replacement after refresh).
    pub fn set(&self, token: SessionToken) {
        *self.lock() = Some(token);
    }

    /// Drop the token (logout, or server-side rejection).
    pub fn clear(&self) {
        *self.lock() = None;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<SessionToken>> {
        self.token.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_anonymous_by_default() {
        let store = SessionStore::default();
        assert!(!store.is_signed_in());
        assert!(store.token().is_none());
    }

    #[test]
    fn test_set_and_clear() {
        let store = SessionStore::default();
        store.set(SessionToken::new("tok-1"));
        assert!(store.is_signed_in());

        store.clear();
        assert!(!store.is_signed_in());
    }

    #[test]
    fn test_clones_share_state() {
        let store = SessionStore::default();
        let view = store.clone();
        store.set(SessionToken::new("tok-1"));
        assert!(view.is_signed_in());
    }
}
