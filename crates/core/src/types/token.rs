//! Session token type.

use secrecy::{ExposeSecret, SecretString};

/// Opaque credential identifying a signed-in account.
///
/// The token format is owned by the remote account API; Persimmon only
/// stores and forwards it. Its presence gates whether cart/favorite
/// mutations are persisted remotely - absence means anonymous mode.
///
/// Wrapped in [`SecretString`] so the value never appears in `Debug`
/// output or logs.
#[derive(Clone)]
pub struct SessionToken(SecretString);

impl SessionToken {
    /// Create a token from its raw string value.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    /// Expose the raw token value for building an `Authorization` header.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SessionToken").field(&"[REDACTED]").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_value() {
        let token = SessionToken::new("super-secret-session-token");
        let debug_output = format!("{token:?}");
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super-secret-session-token"));
    }

    #[test]
    fn test_expose_returns_raw_value() {
        let token = SessionToken::new("tok-1");
        assert_eq!(token.expose(), "tok-1");
    }
}
