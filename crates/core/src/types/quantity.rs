//! Cart line quantity.

use serde::{Deserialize, Deserializer, Serialize};

/// A cart line quantity.
///
/// Quantities are always at least 1: a line that would drop to zero is
/// removed explicitly, never stored with a zero quantity. The constructor
/// floors its input at 1, so a decrement past the bottom leaves the line at
/// quantity 1 instead of silently creating a zero-quantity line.
///
/// ## Examples
///
/// ```
/// use persimmon_core::Quantity;
///
/// assert_eq!(Quantity::new(3).get(), 3);
/// assert_eq!(Quantity::new(0).get(), 1); // floored
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Quantity(u32);

impl Quantity {
    /// The minimum representable quantity.
    pub const MIN: Self = Self(1);

    /// Create a new quantity, flooring the value at 1.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        if value == 0 { Self(1) } else { Self(value) }
    }

    /// Get the underlying value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Add another quantity, saturating at `u32::MAX`.
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self::MIN
    }
}

impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Wire data with a zero quantity is floored rather than rejected, so
        // a single malformed line cannot fail a whole cart fetch.
        u32::deserialize(deserializer).map(Self::new)
    }
}

impl core::fmt::Display for Quantity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_floors_to_one() {
        assert_eq!(Quantity::new(0), Quantity::MIN);
    }

    #[test]
    fn test_nonzero_preserved() {
        assert_eq!(Quantity::new(5).get(), 5);
    }

    #[test]
    fn test_saturating_add() {
        let near_max = Quantity::new(u32::MAX);
        assert_eq!(near_max.saturating_add(Quantity::new(2)).get(), u32::MAX);
        assert_eq!(Quantity::new(1).saturating_add(Quantity::new(1)).get(), 2);
    }

    #[test]
    fn test_deserialize_floors_zero() {
        let q: Quantity = serde_json::from_str("0").expect("deserialize");
        assert_eq!(q, Quantity::MIN);
    }
}
