//! 64-bit token implementation.

use crate::token::traits::Token;
use std::fmt;

/// Position on a ring spanning the whole `u64` space.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct LongToken(pub u64);

impl Token for LongToken {
    fn zero() -> Self {
        LongToken(0)
    }

    fn max() -> Self {
        LongToken(u64::MAX)
    }

    fn is_zero(&self) -> bool {
        self.0 == 0
    }

    fn is_max(&self) -> bool {
        self.0 == u64::MAX
    }

    fn distance_to(&self, other: &Self) -> Self {
        LongToken(other.0.wrapping_sub(self.0))
    }
}

impl LongToken {
    /// Fraction of the full ring this token represents when read as a distance.
    pub fn as_fraction(&self) -> f64 {
        self.0 as f64 / u64::MAX as f64
    }
}

impl fmt::Display for LongToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        assert!(LongToken::zero().is_zero());
        assert!(<LongToken as Token>::max().is_max());
        assert!(!LongToken(42).is_zero());
    }

    #[test]
    fn test_distance_wraps_clockwise() {
        assert_eq!(LongToken(100).distance_to(&LongToken(250)), LongToken(150));
        // Passing through the top of the ring.
        assert_eq!(
            LongToken(u64::MAX - 9).distance_to(&LongToken(10)),
            LongToken(20)
        );
        assert_eq!(LongToken(7).distance_to(&LongToken(7)), LongToken(0));
    }

    #[test]
    fn test_display_is_fixed_width_hex() {
        assert_eq!(LongToken(255).to_string(), "00000000000000ff");
    }
}
