//! GreedHunter Types - Shared foundation types
//!
//! Strongly typed identifiers and the coin amount used across the
//! activity-log pipeline and the wallet ledger.

pub mod coins;
pub mod identity;

pub use coins::Coins;
pub use identity::{ActivityEntryId, IdParseError, TransactionId, UserId, WalletId};
