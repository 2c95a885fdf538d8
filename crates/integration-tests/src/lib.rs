//! Integration tests for Persimmon.
//!
//! This crate hosts an in-process mock of the remote account API so the
//! sync engine can be exercised end-to-end - optimistic mutations, login
//! transitions, the favorites merge, and payment polling - without a
//! network or a deployed backend.
//!
//! The mock keeps its cart/favorites state in memory, counts requests per
//! endpoint, and can be told to fail specific endpoints to exercise the
//! degraded paths.
//!
//! # Example
//!
//! ```rust,ignore
//! let mock = MockApi::spawn().await;
//! let dir = tempfile::tempdir().expect("tempdir");
//! let engine = SyncEngine::new(&mock.config(dir.path(), None)).expect("engine");
//!
//! engine.cart().add(line("A", "red", "M", 1));
//! engine.drain_pending().await;
//! assert_eq!(mock.state.hit_count("cart_add"), 0); // anonymous: no remote calls
//! ```

// Axum handlers must be async even when the body never awaits.
#![allow(clippy::unused_async)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::extract::{Path as UrlPath, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use persimmon_client::ClientConfig;
use persimmon_client::api::types::{CartLineKey, FavoritesSyncRequest};
use persimmon_core::{CartLine, FavoriteEntry, PaymentStatus, SessionToken};
use url::Url;

/// Session token the mock accepts on authenticated endpoints.
pub const TEST_TOKEN: &str = "integration-test-token";

/// Shared state behind the mock account API.
#[derive(Default)]
pub struct MockState {
    cart: Mutex<Vec<CartLine>>,
    favorites: Mutex<Vec<FavoriteEntry>>,
    /// Scripted payment responses, consumed front to back; once empty the
    /// mock keeps answering with the last scripted status (or pending).
    payment_script: Mutex<VecDeque<PaymentStatus>>,
    payment_fallback: Mutex<PaymentStatus>,
    hits: Mutex<HashMap<&'static str, u32>>,
    failing: Mutex<HashSet<&'static str>>,
}

impl MockState {
    /// Seed the remote cart.
    pub fn set_cart(&self, lines: Vec<CartLine>) {
        *lock(&self.cart) = lines;
    }

    /// Snapshot of the remote cart.
    #[must_use]
    pub fn cart(&self) -> Vec<CartLine> {
        lock(&self.cart).clone()
    }

    /// Seed the remote favorites.
    pub fn set_favorites(&self, entries: Vec<FavoriteEntry>) {
        *lock(&self.favorites) = entries;
    }

    /// Snapshot of the remote favorites.
    #[must_use]
    pub fn favorites(&self) -> Vec<FavoriteEntry> {
        lock(&self.favorites).clone()
    }

    /// Script the statuses returned by successive payment checks.
    ///
    /// After the script runs out, every further check answers with the last
    /// scripted status.
    pub fn script_payment(&self, statuses: impl IntoIterator<Item = PaymentStatus>) {
        let script: VecDeque<PaymentStatus> = statuses.into_iter().collect();
        if let Some(last) = script.back() {
            *lock(&self.payment_fallback) = *last;
        }
        *lock(&self.payment_script) = script;
    }

    /// Make an endpoint answer 500 until restored.
    pub fn fail_endpoint(&self, endpoint: &'static str) {
        lock(&self.failing).insert(endpoint);
    }

    /// Restore a previously failed endpoint.
    pub fn restore_endpoint(&self, endpoint: &'static str) {
        lock(&self.failing).remove(endpoint);
    }

    /// How many requests the endpoint has received.
    #[must_use]
    pub fn hit_count(&self, endpoint: &'static str) -> u32 {
        lock(&self.hits).get(endpoint).copied().unwrap_or(0)
    }

    fn record(&self, endpoint: &'static str) -> Option<Response> {
        *lock(&self.hits).entry(endpoint).or_insert(0) += 1;
        if lock(&self.failing).contains(endpoint) {
            return Some((StatusCode::INTERNAL_SERVER_ERROR, "mock failure").into_response());
        }
        None
    }

    fn next_payment_status(&self) -> PaymentStatus {
        lock(&self.payment_script)
            .pop_front()
            .unwrap_or_else(|| *lock(&self.payment_fallback))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Reject requests whose `Authorization` header is not the test token.
fn check_auth(headers: &HeaderMap) -> Option<Response> {
    let authorized = headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == TEST_TOKEN);

    if authorized {
        None
    } else {
        Some((StatusCode::UNAUTHORIZED, "missing or invalid token").into_response())
    }
}

/// A running in-process mock of the account API.
pub struct MockApi {
    base_url: Url,
    /// Handle for seeding and asserting on the mock's state.
    pub state: Arc<MockState>,
}

impl MockApi {
    /// Bind to an ephemeral port and start serving.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound; test-harness only.
    pub async fn spawn() -> Self {
        let state = Arc::new(MockState::default());

        let router = Router::new()
            .route("/api/user/cart", get(fetch_cart))
            .route("/api/user/cart/add", post(cart_add))
            .route("/api/user/cart/remove", post(cart_remove))
            .route("/api/user/cart/update", post(cart_update))
            .route("/api/user/favorites", get(fetch_favorites))
            .route("/api/user/favorites/add", post(favorites_add))
            .route("/api/user/favorites/remove", post(favorites_remove))
            .route("/api/user/favorites/sync", post(favorites_sync))
            .route("/api/payment/get/{id}", post(payment_get))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock listener");
        let addr: SocketAddr = listener.local_addr().expect("mock listener addr");

        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("mock server");
        });

        Self {
            base_url: Url::parse(&format!("http://{addr}")).expect("mock base url"),
            state,
        }
    }

    /// Base URL of the running mock.
    #[must_use]
    pub fn url(&self) -> Url {
        self.base_url.clone()
    }

    /// Build a client configuration pointed at this mock.
    ///
    /// Uses a short poll interval so payment tests run quickly.
    #[must_use]
    pub fn config(&self, data_dir: &Path, session_token: Option<SessionToken>) -> ClientConfig {
        ClientConfig {
            api_url: self.url(),
            data_dir: data_dir.to_path_buf(),
            session_token,
            poll_interval: Duration::from_millis(30),
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

async fn fetch_cart(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    if let Some(resp) = state.record("cart_fetch") {
        return resp;
    }
    if let Some(resp) = check_auth(&headers) {
        return resp;
    }
    Json(state.cart()).into_response()
}

async fn cart_add(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(line): Json<CartLine>,
) -> Response {
    if let Some(resp) = state.record("cart_add") {
        return resp;
    }
    if let Some(resp) = check_auth(&headers) {
        return resp;
    }
    lock(&state.cart).push(line);
    StatusCode::OK.into_response()
}

async fn cart_remove(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(key): Json<CartLineKey>,
) -> Response {
    if let Some(resp) = state.record("cart_remove") {
        return resp;
    }
    if let Some(resp) = check_auth(&headers) {
        return resp;
    }
    lock(&state.cart).retain(|l| !l.matches(&key.product, &key.variant));
    StatusCode::OK.into_response()
}

async fn cart_update(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(update): Json<CartLine>,
) -> Response {
    if let Some(resp) = state.record("cart_update") {
        return resp;
    }
    if let Some(resp) = check_auth(&headers) {
        return resp;
    }
    if let Some(line) = lock(&state.cart)
        .iter_mut()
        .find(|l| l.matches(&update.product, &update.variant))
    {
        line.quantity = update.quantity;
    }
    StatusCode::OK.into_response()
}

async fn fetch_favorites(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    if let Some(resp) = state.record("favorites_fetch") {
        return resp;
    }
    if let Some(resp) = check_auth(&headers) {
        return resp;
    }
    Json(state.favorites()).into_response()
}

async fn favorites_add(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(entry): Json<FavoriteEntry>,
) -> Response {
    if let Some(resp) = state.record("favorites_add") {
        return resp;
    }
    if let Some(resp) = check_auth(&headers) {
        return resp;
    }
    let mut favorites = lock(&state.favorites);
    if !favorites.iter().any(|e| e.product == entry.product) {
        favorites.push(entry);
    }
    StatusCode::OK.into_response()
}

async fn favorites_remove(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(entry): Json<FavoriteEntry>,
) -> Response {
    if let Some(resp) = state.record("favorites_remove") {
        return resp;
    }
    if let Some(resp) = check_auth(&headers) {
        return resp;
    }
    lock(&state.favorites).retain(|e| e.product != entry.product);
    StatusCode::OK.into_response()
}

async fn favorites_sync(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(request): Json<FavoritesSyncRequest>,
) -> Response {
    if let Some(resp) = state.record("favorites_sync") {
        return resp;
    }
    if let Some(resp) = check_auth(&headers) {
        return resp;
    }
    *lock(&state.favorites) = request.favorites;
    StatusCode::OK.into_response()
}

async fn payment_get(
    State(state): State<Arc<MockState>>,
    UrlPath(_id): UrlPath<String>,
) -> Response {
    if let Some(resp) = state.record("payment_get") {
        return resp;
    }
    let status = state.next_payment_status();
    Json(serde_json::json!({ "status": status })).into_response()
}
