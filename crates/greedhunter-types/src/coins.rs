//! Coin amounts
//!
//! Wallet balances are whole coins stored as u64. Arithmetic is always
//! checked so the ledger can report overflow instead of wrapping.

use serde::{Deserialize, Serialize};

/// A whole-coin amount
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Coins(pub u64);

impl Coins {
    pub fn zero() -> Self {
        Self(0)
    }

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl std::fmt::Display for Coins {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} coins", self.0)
    }
}

impl From<u64> for Coins {
    fn from(value: u64) -> Self {
        Self(value)
    }
}
