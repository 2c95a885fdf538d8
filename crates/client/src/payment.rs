//! Payment-status poller.
//!
//! Given an externally created payment id, repeatedly asks the account API
//! for its status until a terminal state is reached or the poller is
//! stopped. An explicit state machine drives a cancellable timer task:
//!
//! ```text
//! Checking --succeeded--> Succeeded (terminal, clears the cart)
//!    |  \--failed/canceled--> Failed (terminal)
//!    \--transport error / unrecognized status--> Checking (try again)
//! ```
//!
//! Transport errors are indistinguishable from "not ready yet" here, so by
//! default the loop polls forever until stopped. Callers that want a bound
//! can set [`PollerConfig::max_checks`].

use std::time::Duration;

use persimmon_core::{PaymentId, PaymentStatus, SessionToken};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::api::StoreApi;
use crate::cart::CartManager;

/// Observable state of a payment poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaymentState {
    /// Waiting for the payment to resolve; checks continue.
    #[default]
    Checking,
    /// Payment completed; the cart has been cleared.
    Succeeded,
    /// Payment failed or was canceled.
    Failed,
}

impl PaymentState {
    /// Whether polling has ended.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

/// Map a reported payment status onto the poller's state machine.
const fn state_for(status: PaymentStatus) -> PaymentState {
    match status {
        PaymentStatus::Pending => PaymentState::Checking,
        PaymentStatus::Succeeded => PaymentState::Succeeded,
        PaymentStatus::Failed | PaymentStatus::Canceled => PaymentState::Failed,
    }
}

/// Poller tuning.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Delay between status checks. The first check fires immediately.
    pub interval: Duration,
    /// Stop after this many checks even without a terminal status.
    /// `None` polls until stopped.
    pub max_checks: Option<u32>,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            max_checks: None,
        }
    }
}

/// Handle to a running payment poll.
///
/// Dropping the handle does not stop the poll; call [`stop`](Self::stop)
/// when the observing view goes away.
#[derive(Debug)]
pub struct PollHandle {
    state: watch::Receiver<PaymentState>,
    task: JoinHandle<()>,
}

impl PollHandle {
    /// Current state of the poll.
    #[must_use]
    pub fn state(&self) -> PaymentState {
        *self.state.borrow()
    }

    /// Wait until the state changes, then return the new state.
    ///
    /// # Errors
    ///
    /// Returns an error if the polling task is gone.
    pub async fn changed(&mut self) -> Result<PaymentState, watch::error::RecvError> {
        self.state.changed().await?;
        Ok(*self.state.borrow_and_update())
    }

    /// Cancel the poll. No further status checks are issued.
    pub fn stop(&self) {
        self.task.abort();
    }

    /// Wait for the poll to end and return the final state.
    ///
    /// Ends either at a terminal state, at the configured check bound, or
    /// when [`stop`](Self::stop) was called.
    pub async fn finished(self) -> PaymentState {
        let _ = self.task.await;
        *self.state.borrow()
    }
}

/// Spawn a poller for the given payment.
pub(crate) fn spawn_poller(
    api: StoreApi,
    token: Option<SessionToken>,
    cart: CartManager,
    payment: PaymentId,
    config: PollerConfig,
) -> PollHandle {
    let (tx, rx) = watch::channel(PaymentState::Checking);

    let task = tokio::spawn(async move {
        let mut interval = tokio::time::interval(config.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut checks: u32 = 0;

        loop {
            // First tick completes immediately, so the initial check is not
            // delayed by a full interval.
            interval.tick().await;
            checks = checks.saturating_add(1);

            match api.payment_status(token.as_ref(), &payment).await {
                Ok(status) => {
                    let state = state_for(status);
                    if state.is_terminal() {
                        if state == PaymentState::Succeeded {
                            cart.clear();
                        }
                        tracing::info!(payment = %payment, ?state, "payment resolved");
                        tx.send_replace(state);
                        return;
                    }
                    tracing::debug!(payment = %payment, checks, "payment still pending");
                }
                Err(e) => {
                    // A transport error is treated as "still pending".
                    tracing::warn!(payment = %payment, error = %e, "payment check failed; will retry");
                }
            }

            if let Some(max) = config.max_checks
                && checks >= max
            {
                tracing::info!(payment = %payment, checks, "payment poll bound reached");
                return;
            }
        }
    });

    PollHandle { state: rx, task }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_mapping() {
        assert_eq!(state_for(PaymentStatus::Pending), PaymentState::Checking);
        assert_eq!(state_for(PaymentStatus::Succeeded), PaymentState::Succeeded);
        assert_eq!(state_for(PaymentStatus::Failed), PaymentState::Failed);
        assert_eq!(state_for(PaymentStatus::Canceled), PaymentState::Failed);
    }

    #[test]
    fn test_terminal_states() {
        assert!(!PaymentState::Checking.is_terminal());
        assert!(PaymentState::Succeeded.is_terminal());
        assert!(PaymentState::Failed.is_terminal());
    }

    #[test]
    fn test_default_config_polls_unbounded_every_ten_seconds() {
        let config = PollerConfig::default();
        assert_eq!(config.interval, Duration::from_secs(10));
        assert!(config.max_checks.is_none());
    }
}
