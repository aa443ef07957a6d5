//! Journey direction codes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Direction of travel at a station, as reported by SL.
///
/// Real departures carry code 1 or 2. Code 0 is reserved and never produced
/// by upstream; it is left untouched by [`Direction::swapped`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Direction(i64);

impl Direction {
    /// Reserved slot, not a real direction.
    pub const RESERVED: Self = Self(0);
    pub const ONE: Self = Self(1);
    pub const TWO: Self = Self(2);

    pub fn new(code: i64) -> Self {
        Self(code)
    }

    /// Exchange direction 1 and 2. Every other code maps to itself.
    pub fn swapped(self) -> Self {
        match self {
            Self::ONE => Self::TWO,
            Self::TWO => Self::ONE,
            other => other,
        }
    }
}

impl fmt::Debug for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Direction({})", self.0)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Swapping twice is the identity for every code
        #[test]
        fn swap_is_involution(code in any::<i64>()) {
            let dir = Direction::new(code);
            prop_assert_eq!(dir.swapped().swapped(), dir);
        }

        /// Codes other than 1 and 2 are never remapped
        #[test]
        fn other_codes_fixed(code in any::<i64>().prop_filter("not 1 or 2", |c| *c != 1 && *c != 2)) {
            prop_assert_eq!(Direction::new(code).swapped(), Direction::new(code));
        }
    }
}
