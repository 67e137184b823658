use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Rials, WalletId};

pub type EntryId = Uuid;

/// Bounds on the amount of a single deposit or withdrawal. Enforced by
/// the request-handling layer before an operation reaches the service.
pub const ENTRY_AMOUNT_MIN: Rials = 100_000;
pub const ENTRY_AMOUNT_MAX: Rials = 10_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    /// Funds credited to the wallet
    Deposit,
    /// Funds debited from the wallet
    Withdrawal,
}

impl EntryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryType::Deposit => "deposit",
            EntryType::Withdrawal => "withdrawal",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "deposit" => Some(EntryType::Deposit),
            "withdrawal" => Some(EntryType::Withdrawal),
            _ => None,
        }
    }
}

impl std::fmt::Display for EntryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One recorded balance change. Entries are append-only: the service
/// creates them alongside the balance update and nothing ever edits or
/// deletes them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: EntryId,
    /// The wallet whose balance changed
    pub wallet_id: WalletId,
    pub entry_type: EntryType,
    /// Amount in rials (always positive)
    pub amount: Rials,
    pub occurred_at: DateTime<Utc>,
}

impl LedgerEntry {
    pub fn new(wallet_id: WalletId, entry_type: EntryType, amount: Rials) -> Self {
        assert!(amount > 0, "Entry amount must be positive");
        Self {
            id: Uuid::new_v4(),
            wallet_id,
            entry_type,
            amount,
            occurred_at: Utc::now(),
        }
    }

    /// Whether an amount lies within the per-entry bounds the request
    /// layer accepts.
    pub fn amount_within_limits(amount: Rials) -> bool {
        (ENTRY_AMOUNT_MIN..=ENTRY_AMOUNT_MAX).contains(&amount)
    }
}
