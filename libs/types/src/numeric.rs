//! Integer value amounts
//!
//! All value is counted in wei, the smallest indivisible unit. Amounts are
//! unsigned so a negative balance cannot be represented, and every
//! arithmetic helper is checked: overflow yields `None`, never a wrapped value.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of wei in one ether.
pub const WEI_PER_ETHER: u128 = 1_000_000_000_000_000_000;

/// A non-negative amount of value in wei.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Wei(u128);

impl Wei {
    pub const ZERO: Wei = Wei(0);
    pub const MAX: Wei = Wei(u128::MAX);

    pub const fn new(value: u128) -> Self {
        Self(value)
    }

    /// Whole ether to wei. `None` if the result does not fit.
    pub fn ether(whole: u128) -> Option<Self> {
        whole.checked_mul(WEI_PER_ETHER).map(Self)
    }

    pub const fn get(self) -> u128 {
        self.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, rhs: Wei) -> Option<Wei> {
        self.0.checked_add(rhs.0).map(Wei)
    }

    pub fn checked_sub(self, rhs: Wei) -> Option<Wei> {
        self.0.checked_sub(rhs.0).map(Wei)
    }

    /// Sum a sequence of amounts, `None` on overflow.
    pub fn checked_sum<'a, I>(amounts: I) -> Option<Wei>
    where
        I: IntoIterator<Item = &'a Wei>,
    {
        amounts
            .into_iter()
            .try_fold(Wei::ZERO, |acc, amount| acc.checked_add(*amount))
    }
}

impl From<u128> for Wei {
    fn from(value: u128) -> Self {
        Self(value)
    }
}

impl fmt::Display for Wei {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} wei", self.0)
    }
}
