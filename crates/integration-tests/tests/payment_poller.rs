//! End-to-end tests for the payment-status poller.

use std::time::Duration;

use persimmon_client::{PaymentState, PollerConfig, SyncEngine};
use persimmon_core::{CartLine, PaymentId, PaymentStatus, ProductId, Quantity, SessionToken, VariantKey};
use persimmon_integration_tests::{MockApi, TEST_TOKEN};

fn line(product: &str) -> CartLine {
    CartLine::new(
        ProductId::new(product),
        VariantKey::new("red", "M"),
        Quantity::new(1),
    )
}

#[tokio::test]
async fn immediate_success_clears_cart_and_stops_polling() {
    let mock = MockApi::spawn().await;
    mock.state.script_payment([PaymentStatus::Succeeded]);

    let dir = tempfile::tempdir().expect("tempdir");
    let engine = SyncEngine::new(&mock.config(dir.path(), None)).expect("engine");
    engine.cart().add(line("A"));

    let handle = engine.watch_payment(PaymentId::new("P123"));
    assert_eq!(handle.finished().await, PaymentState::Succeeded);
    assert!(engine.cart().lines().is_empty());

    // Terminal means terminal: no further checks are issued.
    let checks = mock.state.hit_count("payment_get");
    assert_eq!(checks, 1);
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(mock.state.hit_count("payment_get"), checks);
}

#[tokio::test]
async fn failed_payment_is_terminal_and_keeps_cart() {
    let mock = MockApi::spawn().await;
    mock.state
        .script_payment([PaymentStatus::Pending, PaymentStatus::Failed]);

    let dir = tempfile::tempdir().expect("tempdir");
    let engine = SyncEngine::new(&mock.config(dir.path(), None)).expect("engine");
    engine.cart().add(line("A"));

    let handle = engine.watch_payment(PaymentId::new("P124"));
    assert_eq!(handle.finished().await, PaymentState::Failed);

    // Only success clears the cart.
    assert_eq!(engine.cart().lines(), vec![line("A")]);
    assert_eq!(mock.state.hit_count("payment_get"), 2);
}

#[tokio::test]
async fn canceled_payment_maps_to_failed() {
    let mock = MockApi::spawn().await;
    mock.state.script_payment([PaymentStatus::Canceled]);

    let dir = tempfile::tempdir().expect("tempdir");
    let engine = SyncEngine::new(&mock.config(dir.path(), None)).expect("engine");

    let handle = engine.watch_payment(PaymentId::new("P125"));
    assert_eq!(handle.finished().await, PaymentState::Failed);
}

#[tokio::test]
async fn transport_errors_keep_polling_until_stopped() {
    let mock = MockApi::spawn().await;
    mock.state.fail_endpoint("payment_get");

    let dir = tempfile::tempdir().expect("tempdir");
    let engine = SyncEngine::new(&mock.config(dir.path(), None)).expect("engine");

    let handle = engine.watch_payment(PaymentId::new("P999"));
    tokio::time::sleep(Duration::from_millis(200)).await;

    // Still checking, still retrying on the fixed interval.
    assert_eq!(handle.state(), PaymentState::Checking);
    assert!(mock.state.hit_count("payment_get") >= 3);

    handle.stop();
    tokio::time::sleep(Duration::from_millis(100)).await;
    let after_stop = mock.state.hit_count("payment_get");
    tokio::time::sleep(Duration::from_millis(100)).await;

    // Cancellation is the only way out; once stopped, no further checks.
    assert_eq!(mock.state.hit_count("payment_get"), after_stop);
}

#[tokio::test]
async fn check_bound_ends_polling_without_terminal_state() {
    let mock = MockApi::spawn().await;
    mock.state.script_payment([PaymentStatus::Pending]);

    let dir = tempfile::tempdir().expect("tempdir");
    let engine = SyncEngine::new(&mock.config(dir.path(), None)).expect("engine");

    let handle = engine.watch_payment_with(
        PaymentId::new("P321"),
        PollerConfig {
            interval: Duration::from_millis(30),
            max_checks: Some(3),
        },
    );

    assert_eq!(handle.finished().await, PaymentState::Checking);
    assert_eq!(mock.state.hit_count("payment_get"), 3);
}

#[tokio::test]
async fn signed_in_poller_passes_the_session_token() {
    let mock = MockApi::spawn().await;
    mock.state.script_payment([PaymentStatus::Succeeded]);

    let dir = tempfile::tempdir().expect("tempdir");
    let engine = SyncEngine::new(&mock.config(dir.path(), Some(SessionToken::new(TEST_TOKEN))))
        .expect("engine");

    let handle = engine.watch_payment(PaymentId::new("P126"));
    assert_eq!(handle.finished().await, PaymentState::Succeeded);
}
