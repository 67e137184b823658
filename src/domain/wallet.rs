use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::{Rials, UserId};

pub type WalletId = Uuid;

/// Floor below which no withdrawal may take a wallet's balance.
/// New wallets open with exactly this amount.
pub const MINIMUM_BALANCE: Rials = 10_000;

/// Violations of the wallet's own balance rules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalletError {
    #[error("Amount must be positive")]
    NonPositiveAmount,
    #[error("Withdrawal would result in a balance below the minimum of 10,000")]
    BelowMinimumBalance,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wallet {
    pub id: WalletId,
    pub owner_id: UserId,
    pub account_number: String,
    pub shaba_number: String,
    /// Current balance in rials. Only `add_funds` and `withdraw_funds`
    /// may change it.
    pub balance: Rials,
    /// Optimistic-lock counter. The repository bumps it on every balance
    /// update and refuses updates carrying a stale value.
    pub version: i64,
    pub created_at: DateTime<Utc>,
}

impl Wallet {
    /// Open a wallet for a user, funded at the minimum balance.
    pub fn new(owner_id: UserId, account_number: String, shaba_number: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            account_number,
            shaba_number,
            balance: MINIMUM_BALANCE,
            version: 0,
            created_at: Utc::now(),
        }
    }

    /// Credit the wallet. The amount must be strictly positive.
    pub fn add_funds(&mut self, amount: Rials) -> Result<(), WalletError> {
        if amount <= 0 {
            return Err(WalletError::NonPositiveAmount);
        }
        self.balance += amount;
        Ok(())
    }

    /// Debit the wallet. The balance may never drop below `MINIMUM_BALANCE`,
    /// and the amount must be strictly positive. On failure the balance is
    /// left untouched.
    pub fn withdraw_funds(&mut self, amount: Rials) -> Result<(), WalletError> {
        if self.balance - amount < MINIMUM_BALANCE {
            return Err(WalletError::BelowMinimumBalance);
        }
        if amount <= 0 {
            return Err(WalletError::NonPositiveAmount);
        }
        self.balance -= amount;
        Ok(())
    }

    /// Exact-match check of both account identifiers. No side effects.
    pub fn authenticate(&self, account_number: &str, shaba_number: &str) -> bool {
        self.account_number == account_number && self.shaba_number == shaba_number
    }
}
