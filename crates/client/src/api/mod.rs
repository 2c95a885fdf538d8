//! Account API client.
//!
//! Plain REST/JSON over `reqwest`. Authenticated calls carry the session
//! token verbatim in the `Authorization` header; the token format is owned
//! by the remote API. Responses are read as text first so parse failures can
//! be diagnosed from the body.

pub mod types;

use std::sync::Arc;

use persimmon_core::{CartLine, FavoriteEntry, PaymentId, PaymentStatus, ProductId, SessionToken, VariantKey};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::instrument;
use url::Url;

use types::{CartLineKey, FavoritesSyncRequest, PaymentStatusResponse};

/// Errors that can occur when calling the account API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-success response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse a response body.
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Client for the remote account API.
///
/// Cheaply cloneable via `Arc`. Carries no token itself - every
/// authenticated call takes the session token explicitly, so one client
/// serves both anonymous and signed-in flows.
#[derive(Clone)]
pub struct StoreApi {
    inner: Arc<StoreApiInner>,
}

struct StoreApiInner {
    client: reqwest::Client,
    base: String,
}

impl StoreApi {
    /// Create a new account API client.
    #[must_use]
    pub fn new(api_url: &Url) -> Self {
        Self {
            inner: Arc::new(StoreApiInner {
                client: reqwest::Client::new(),
                base: api_url.as_str().trim_end_matches('/').to_string(),
            }),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base)
    }

    /// Issue a GET and parse the JSON body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        token: &SessionToken,
    ) -> Result<T, ApiError> {
        let response = self
            .inner
            .client
            .get(self.url(path))
            .header("Authorization", token.expose())
            .send()
            .await?;

        Self::parse_body(response).await
    }

    /// Issue a POST with a JSON body and parse the JSON response.
    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&SessionToken>,
        body: &B,
    ) -> Result<T, ApiError> {
        let mut request = self.inner.client.post(self.url(path)).json(body);
        if let Some(token) = token {
            request = request.header("Authorization", token.expose());
        }

        let response = request.send().await?;
        Self::parse_body(response).await
    }

    /// Issue a POST with a JSON body, expecting no meaningful response body.
    async fn post_ack<B: Serialize + ?Sized>(
        &self,
        path: &str,
        token: &SessionToken,
        body: &B,
    ) -> Result<(), ApiError> {
        let response = self
            .inner
            .client
            .post(self.url(path))
            .header("Authorization", token.expose())
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ApiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }

    /// Check the status and parse the body as JSON, keeping the raw text for
    /// diagnostics on failure.
    async fn parse_body<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ApiError::Api {
                status: status.as_u16(),
                message: body.chars().take(500).collect(),
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "failed to parse account API response"
            );
            ApiError::Parse(e)
        })
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Fetch the account's authoritative cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not parse.
    #[instrument(skip(self, token))]
    pub async fn fetch_cart(&self, token: &SessionToken) -> Result<Vec<CartLine>, ApiError> {
        self.get_json("/api/user/cart", token).await
    }

    /// Persist a newly added cart line.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token, line), fields(product = %line.product))]
    pub async fn add_cart_line(
        &self,
        token: &SessionToken,
        line: &CartLine,
    ) -> Result<(), ApiError> {
        self.post_ack("/api/user/cart/add", token, line).await
    }

    /// Persist removal of a cart line.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip_all, fields(product = %product))]
    pub async fn remove_cart_line(
        &self,
        token: &SessionToken,
        product: &ProductId,
        variant: &VariantKey,
    ) -> Result<(), ApiError> {
        let key = CartLineKey {
            product: product.clone(),
            variant: variant.clone(),
        };
        self.post_ack("/api/user/cart/remove", token, &key).await
    }

    /// Persist a quantity change for an existing cart line.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token, line), fields(product = %line.product))]
    pub async fn update_cart_line(
        &self,
        token: &SessionToken,
        line: &CartLine,
    ) -> Result<(), ApiError> {
        self.post_ack("/api/user/cart/update", token, line).await
    }

    // =========================================================================
    // Favorites
    // =========================================================================

    /// Fetch the account's authoritative favorites.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not parse.
    #[instrument(skip(self, token))]
    pub async fn fetch_favorites(
        &self,
        token: &SessionToken,
    ) -> Result<Vec<FavoriteEntry>, ApiError> {
        self.get_json("/api/user/favorites", token).await
    }

    /// Persist a newly favorited product.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token), fields(product = %entry.product))]
    pub async fn add_favorite(
        &self,
        token: &SessionToken,
        entry: &FavoriteEntry,
    ) -> Result<(), ApiError> {
        self.post_ack("/api/user/favorites/add", token, entry).await
    }

    /// Persist removal of a favorited product.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token), fields(product = %entry.product))]
    pub async fn remove_favorite(
        &self,
        token: &SessionToken,
        entry: &FavoriteEntry,
    ) -> Result<(), ApiError> {
        self.post_ack("/api/user/favorites/remove", token, entry)
            .await
    }

    /// Push a merged favorites set as the new authoritative remote state.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token, favorites), fields(count = favorites.len()))]
    pub async fn sync_favorites(
        &self,
        token: &SessionToken,
        favorites: &[FavoriteEntry],
    ) -> Result<(), ApiError> {
        let request = FavoritesSyncRequest {
            favorites: favorites.to_vec(),
        };
        self.post_ack("/api/user/favorites/sync", token, &request)
            .await
    }

    // =========================================================================
    // Payments
    // =========================================================================

    /// Poll the status of an externally created payment.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not parse.
    #[instrument(skip(self, token), fields(payment = %payment))]
    pub async fn payment_status(
        &self,
        token: Option<&SessionToken>,
        payment: &PaymentId,
    ) -> Result<PaymentStatus, ApiError> {
        let path = format!("/api/payment/get/{payment}");
        let response: PaymentStatusResponse = self
            .post_json(&path, token, &serde_json::json!({}))
            .await?;
        Ok(response.status)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_without_double_slash() {
        let base = Url::parse("https://shop.example.com/").unwrap();
        let api = StoreApi::new(&base);
        assert_eq!(
            api.url("/api/user/cart"),
            "https://shop.example.com/api/user/cart"
        );
    }

    #[test]
    fn test_api_error_display() {
        let err = ApiError::Api {
            status: 503,
            message: "upstream down".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 503 - upstream down");
    }
}
