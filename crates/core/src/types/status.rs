//! Payment status reported by the account API.

use serde::{Deserialize, Deserializer, Serialize};

/// Terminal-or-pending status of an externally created payment.
///
/// The poller keeps checking while the status is non-terminal. Statuses the
/// client does not recognize deserialize as [`Pending`](Self::Pending), so an
/// ambiguous response leaves the poller checking rather than failing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Payment completed; the cart is cleared.
    Succeeded,
    /// Payment failed.
    Failed,
    /// Payment canceled by the buyer or the provider.
    Canceled,
    /// Payment not yet resolved; keep checking.
    #[default]
    Pending,
}

impl PaymentStatus {
    /// Whether this status ends polling.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Canceled)
    }
}

impl<'de> Deserialize<'de> for PaymentStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let status = String::deserialize(deserializer)?;
        Ok(match status.as_str() {
            "succeeded" => Self::Succeeded,
            "failed" => Self::Failed,
            "canceled" => Self::Canceled,
            // Anything else, "pending" included, means keep checking.
            _ => Self::Pending,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(!PaymentStatus::Pending.is_terminal());
        assert!(PaymentStatus::Succeeded.is_terminal());
        assert!(PaymentStatus::Failed.is_terminal());
        assert!(PaymentStatus::Canceled.is_terminal());
    }

    #[test]
    fn test_unrecognized_status_is_pending() {
        let status: PaymentStatus = serde_json::from_str("\"processing\"").expect("deserialize");
        assert_eq!(status, PaymentStatus::Pending);
    }

    #[test]
    fn test_known_statuses_round_trip() {
        let status: PaymentStatus = serde_json::from_str("\"succeeded\"").expect("deserialize");
        assert_eq!(status, PaymentStatus::Succeeded);
        assert_eq!(
            serde_json::to_string(&PaymentStatus::Canceled).expect("serialize"),
            "\"canceled\""
        );
    }
}
