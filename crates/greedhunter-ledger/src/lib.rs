//! GreedHunter Ledger - Per-user coin wallet
//!
//! The ledger is:
//! - Wallet-keyed by UserId (one wallet per user, created on first earn)
//! - Append-only (transactions are never mutated or removed)
//! - Audit-linked (every successful mutation produces one activity entry)
//! - Atomic (balance check and mutation happen in one critical section)
//!
//! # Invariants
//!
//! 1. No negative balances
//! 2. A frozen wallet rejects every balance mutation
//! 3. A rejected operation leaves balance and history untouched
//! 4. Every successful mutation appends exactly one `wallet_transaction`
//!    activity entry per affected user

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use greedhunter_activity::{event_types, ActivityEventBuilder, ActivityRecorder};
use greedhunter_context::RequestMeta;
use greedhunter_types::{Coins, TransactionId, UserId, WalletId};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tokio::sync::RwLock;

/// Errors that can occur in wallet operations
#[derive(Error, Debug)]
pub enum WalletError {
    #[error("Wallet not found for user: {user}")]
    WalletNotFound { user: String },

    #[error("Insufficient balance: have {available}, need {required}")]
    InsufficientBalance { available: u64, required: u64 },

    #[error("Wallet is frozen: {user}")]
    WalletFrozen { user: String },

    #[error("Wallet is not frozen: {user}")]
    WalletNotFrozen { user: String },

    #[error("Invalid amount: {message}")]
    InvalidAmount { message: String },

    #[error("Balance overflow")]
    BalanceOverflow,
}

pub type Result<T> = std::result::Result<T, WalletError>;

/// Wallet state. Frozen wallets reject earn/spend/transfer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalletStatus {
    #[default]
    Active,
    Frozen,
}

impl WalletStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Frozen => "frozen",
        }
    }
}

/// Kind of ledger transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Coins earned through platform activity
    Earn,
    /// Coins spent in the store
    Spend,
    /// Coins granted by the platform (promotions, admin)
    Bonus,
    /// Coins returned after a reversed spend
    Refund,
}

impl TransactionKind {
    /// Whether this kind increases the balance
    pub fn is_credit(&self) -> bool {
        matches!(self, Self::Earn | Self::Bonus | Self::Refund)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Earn => "earn",
            Self::Spend => "spend",
            Self::Bonus => "bonus",
            Self::Refund => "refund",
        }
    }
}

/// One ledger transaction, immutable once written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletTransaction {
    pub id: TransactionId,
    pub kind: TransactionKind,
    pub amount: Coins,
    pub resulting_balance: Coins,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// A user's coin wallet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wallet {
    pub id: WalletId,
    pub user_id: UserId,
    pub balance: Coins,
    pub status: WalletStatus,
    pub transactions: Vec<WalletTransaction>,
    pub created_at: DateTime<Utc>,
}

impl Wallet {
    fn new(user_id: UserId) -> Self {
        Self {
            id: WalletId::new(),
            user_id,
            balance: Coins::zero(),
            status: WalletStatus::Active,
            transactions: Vec::new(),
            created_at: Utc::now(),
        }
    }

    fn apply(&mut self, kind: TransactionKind, amount: Coins, new_balance: Coins, description: &str) {
        self.balance = new_balance;
        self.transactions.push(WalletTransaction {
            id: TransactionId::new(),
            kind,
            amount,
            resulting_balance: new_balance,
            description: description.to_string(),
            created_at: Utc::now(),
        });
    }
}

/// Wallet IDs and balances produced by one transfer
struct TransferOutcome {
    sender_wallet: WalletId,
    sender_balance: Coins,
    receiver_wallet: WalletId,
    receiver_balance: Coins,
}

/// Summary for dashboard-style consumers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletOverview {
    pub wallet_id: WalletId,
    pub balance: Coins,
    pub status: WalletStatus,
    pub transaction_count: usize,
    pub created_at: DateTime<Utc>,
}

/// The GreedHunter wallet ledger
///
/// Owns every user's balance and transaction history. Each operation holds
/// the wallet-map write lock across its validation and mutation, so a
/// concurrent deduction can never observe a stale balance.
#[derive(Clone)]
pub struct WalletLedger {
    wallets: Arc<RwLock<HashMap<UserId, Wallet>>>,
    recorder: ActivityRecorder,
}

impl WalletLedger {
    pub fn new(recorder: ActivityRecorder) -> Self {
        Self {
            wallets: Arc::new(RwLock::new(HashMap::new())),
            recorder,
        }
    }

    /// Current balance. Absent wallets are reported, not defaulted to zero.
    pub async fn balance(&self, user: &UserId) -> Result<Coins> {
        let wallets = self.wallets.read().await;
        wallets
            .get(user)
            .map(|w| w.balance)
            .ok_or_else(|| WalletError::WalletNotFound { user: user.to_string() })
    }

    /// Credit coins to a user's wallet, creating it on first use.
    ///
    /// `kind` must be a credit kind (earn, bonus or refund). Returns the new
    /// balance.
    pub async fn add_coins(
        &self,
        user: &UserId,
        amount: Coins,
        kind: TransactionKind,
        description: &str,
        request: Option<&RequestMeta>,
    ) -> Result<Coins> {
        let result = self.credit(user, amount, kind, description).await;

        match &result {
            Ok((wallet_id, new_balance)) => {
                self.record_transaction(user, wallet_id, kind, amount, *new_balance, description, request)
                    .await;
            }
            Err(e) => self.record_rejection(user, "add_coins", amount, e, request).await,
        }

        result.map(|(_, balance)| balance)
    }

    /// Debit coins from a user's wallet.
    ///
    /// Insufficient funds is a reported error, never a clamp to zero.
    /// Returns the new balance.
    pub async fn deduct_coins(
        &self,
        user: &UserId,
        amount: Coins,
        description: &str,
        request: Option<&RequestMeta>,
    ) -> Result<Coins> {
        let result = self.debit(user, amount, description).await;

        match &result {
            Ok((wallet_id, new_balance)) => {
                self.record_transaction(
                    user,
                    wallet_id,
                    TransactionKind::Spend,
                    amount,
                    *new_balance,
                    description,
                    request,
                )
                .await;
            }
            Err(e) => {
                self.record_rejection(user, "deduct_coins", amount, e, request).await;
            }
        }

        result.map(|(_, balance)| balance)
    }

    /// Move coins between two users as one logical unit.
    ///
    /// Both wallets are validated before either is touched, under a single
    /// write lock: either both balances update or neither does. The
    /// receiver's wallet is created on first transfer to it.
    pub async fn transfer_coins(
        &self,
        from: &UserId,
        to: &UserId,
        amount: Coins,
        description: &str,
        request: Option<&RequestMeta>,
    ) -> Result<()> {
        let result = self.apply_transfer(from, to, amount, description).await;

        match &result {
            Ok(transfer) => {
                self.record_transaction(
                    from,
                    &transfer.sender_wallet,
                    TransactionKind::Spend,
                    amount,
                    transfer.sender_balance,
                    description,
                    request,
                )
                .await;
                self.record_transaction(
                    to,
                    &transfer.receiver_wallet,
                    TransactionKind::Earn,
                    amount,
                    transfer.receiver_balance,
                    description,
                    request,
                )
                .await;
            }
            Err(e) => {
                self.record_rejection(from, "transfer_coins", amount, e, request).await;
            }
        }

        result.map(|_| ())
    }

    /// Freeze a wallet. Active -> Frozen; freezing a frozen wallet is an error.
    pub async fn freeze_wallet(&self, user: &UserId, request: Option<&RequestMeta>) -> Result<()> {
        let wallet_id = {
            let mut wallets = self.wallets.write().await;
            let wallet = wallets
                .get_mut(user)
                .ok_or_else(|| WalletError::WalletNotFound { user: user.to_string() })?;
            if wallet.status == WalletStatus::Frozen {
                return Err(WalletError::WalletFrozen { user: user.to_string() });
            }
            wallet.status = WalletStatus::Frozen;
            wallet.id.clone()
        };

        self.record_status_change(user, &wallet_id, WalletStatus::Frozen, request).await;
        Ok(())
    }

    /// Unfreeze a wallet. Frozen -> Active; unfreezing an active wallet is an error.
    pub async fn unfreeze_wallet(&self, user: &UserId, request: Option<&RequestMeta>) -> Result<()> {
        let wallet_id = {
            let mut wallets = self.wallets.write().await;
            let wallet = wallets
                .get_mut(user)
                .ok_or_else(|| WalletError::WalletNotFound { user: user.to_string() })?;
            if wallet.status == WalletStatus::Active {
                return Err(WalletError::WalletNotFrozen { user: user.to_string() });
            }
            wallet.status = WalletStatus::Active;
            wallet.id.clone()
        };

        self.record_status_change(user, &wallet_id, WalletStatus::Active, request).await;
        Ok(())
    }

    /// Ordered transaction history, oldest first. Read-only.
    pub async fn transaction_history(&self, user: &UserId) -> Result<Vec<WalletTransaction>> {
        let wallets = self.wallets.read().await;
        wallets
            .get(user)
            .map(|w| w.transactions.clone())
            .ok_or_else(|| WalletError::WalletNotFound { user: user.to_string() })
    }

    /// Wallet summary for dashboards
    pub async fn wallet_overview(&self, user: &UserId) -> Result<WalletOverview> {
        let wallets = self.wallets.read().await;
        wallets
            .get(user)
            .map(|w| WalletOverview {
                wallet_id: w.id.clone(),
                balance: w.balance,
                status: w.status,
                transaction_count: w.transactions.len(),
                created_at: w.created_at,
            })
            .ok_or_else(|| WalletError::WalletNotFound { user: user.to_string() })
    }

    // =========================================================================
    // Critical sections
    // =========================================================================

    async fn credit(
        &self,
        user: &UserId,
        amount: Coins,
        kind: TransactionKind,
        description: &str,
    ) -> Result<(WalletId, Coins)> {
        if amount.is_zero() {
            return Err(WalletError::InvalidAmount {
                message: "Amount must be greater than zero".to_string(),
            });
        }
        if !kind.is_credit() {
            return Err(WalletError::InvalidAmount {
                message: format!("{} is not a credit kind", kind.as_str()),
            });
        }

        let mut wallets = self.wallets.write().await;
        let wallet = wallets
            .entry(user.clone())
            .or_insert_with(|| Wallet::new(user.clone()));

        if wallet.status == WalletStatus::Frozen {
            return Err(WalletError::WalletFrozen { user: user.to_string() });
        }

        let new_balance = wallet
            .balance
            .checked_add(amount)
            .ok_or(WalletError::BalanceOverflow)?;
        wallet.apply(kind, amount, new_balance, description);

        Ok((wallet.id.clone(), new_balance))
    }

    async fn debit(
        &self,
        user: &UserId,
        amount: Coins,
        description: &str,
    ) -> Result<(WalletId, Coins)> {
        if amount.is_zero() {
            return Err(WalletError::InvalidAmount {
                message: "Amount must be greater than zero".to_string(),
            });
        }

        let mut wallets = self.wallets.write().await;
        let wallet = wallets
            .get_mut(user)
            .ok_or_else(|| WalletError::WalletNotFound { user: user.to_string() })?;

        if wallet.status == WalletStatus::Frozen {
            return Err(WalletError::WalletFrozen { user: user.to_string() });
        }

        // Check and decrement under the same lock: no lost-update window
        let new_balance =
            wallet
                .balance
                .checked_sub(amount)
                .ok_or(WalletError::InsufficientBalance {
                    available: wallet.balance.0,
                    required: amount.0,
                })?;
        wallet.apply(TransactionKind::Spend, amount, new_balance, description);

        Ok((wallet.id.clone(), new_balance))
    }

    async fn apply_transfer(
        &self,
        from: &UserId,
        to: &UserId,
        amount: Coins,
        description: &str,
    ) -> Result<TransferOutcome> {
        if amount.is_zero() {
            return Err(WalletError::InvalidAmount {
                message: "Amount must be greater than zero".to_string(),
            });
        }
        if from == to {
            return Err(WalletError::InvalidAmount {
                message: "Cannot transfer to the same wallet".to_string(),
            });
        }

        let mut wallets = self.wallets.write().await;

        // Validate everything before mutating anything
        let sender = wallets
            .get(from)
            .ok_or_else(|| WalletError::WalletNotFound { user: from.to_string() })?;
        if sender.status == WalletStatus::Frozen {
            return Err(WalletError::WalletFrozen { user: from.to_string() });
        }
        let sender_balance =
            sender
                .balance
                .checked_sub(amount)
                .ok_or(WalletError::InsufficientBalance {
                    available: sender.balance.0,
                    required: amount.0,
                })?;

        let receiver_current = match wallets.get(to) {
            Some(receiver) => {
                if receiver.status == WalletStatus::Frozen {
                    return Err(WalletError::WalletFrozen { user: to.to_string() });
                }
                receiver.balance
            }
            None => Coins::zero(),
        };
        let receiver_balance = receiver_current
            .checked_add(amount)
            .ok_or(WalletError::BalanceOverflow)?;

        // Apply both sides
        let mut sender_wallet = None;
        if let Some(sender) = wallets.get_mut(from) {
            sender.apply(TransactionKind::Spend, amount, sender_balance, description);
            sender_wallet = Some(sender.id.clone());
        }
        let sender_wallet = sender_wallet
            .ok_or_else(|| WalletError::WalletNotFound { user: from.to_string() })?;
        let receiver = wallets
            .entry(to.clone())
            .or_insert_with(|| Wallet::new(to.clone()));
        receiver.apply(TransactionKind::Earn, amount, receiver_balance, description);

        Ok(TransferOutcome {
            sender_wallet,
            sender_balance,
            receiver_wallet: receiver.id.clone(),
            receiver_balance,
        })
    }

    // =========================================================================
    // Audit trail
    // =========================================================================

    async fn record_transaction(
        &self,
        user: &UserId,
        wallet_id: &WalletId,
        kind: TransactionKind,
        amount: Coins,
        resulting_balance: Coins,
        description: &str,
        request: Option<&RequestMeta>,
    ) {
        let mut activity = ActivityEventBuilder::new(event_types::WALLET_TRANSACTION, description)
            .entity("wallet", wallet_id.as_uuid().to_string())
            .prop("transaction_kind", json!(kind.as_str()))
            .prop("amount", json!(amount.0))
            .prop("resulting_balance", json!(resulting_balance.0));
        if let Some(meta) = request {
            activity = activity.request(meta);
        }
        self.recorder.record(user, activity).await;
    }

    async fn record_status_change(
        &self,
        user: &UserId,
        wallet_id: &WalletId,
        status: WalletStatus,
        request: Option<&RequestMeta>,
    ) {
        let description = match status {
            WalletStatus::Frozen => "Wallet frozen",
            WalletStatus::Active => "Wallet unfrozen",
        };
        let mut activity = ActivityEventBuilder::new(event_types::WALLET_STATUS, description)
            .entity("wallet", wallet_id.as_uuid().to_string())
            .prop("status", json!(status.as_str()));
        if let Some(meta) = request {
            activity = activity.request(meta);
        }
        self.recorder.record(user, activity).await;
    }

    /// Audit of rejected attempts, off by default
    async fn record_rejection(
        &self,
        user: &UserId,
        operation: &str,
        amount: Coins,
        error: &WalletError,
        request: Option<&RequestMeta>,
    ) {
        if !self.recorder.log_failed_wallet_ops() {
            return;
        }

        let wallet_id = self.wallets.read().await.get(user).map(|w| w.id.clone());
        let mut activity = ActivityEventBuilder::new(
            event_types::WALLET_TRANSACTION,
            format!("Rejected {operation}: {error}"),
        )
        .prop("operation", json!(operation))
        .prop("amount", json!(amount.0))
        .prop("rejected", json!(true));
        if let Some(id) = wallet_id {
            activity = activity.entity("wallet", id.as_uuid().to_string());
        }
        if let Some(meta) = request {
            activity = activity.request(meta);
        }
        self.recorder.record(user, activity).await;
    }
}
