use thiserror::Error;

use crate::domain::Rials;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Wallet not found: {0}")]
    WalletNotFound(String),

    #[error("Wallet already exists for user: {0}")]
    WalletAlreadyExists(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("User must be at least 18 years old to open a wallet")]
    UserNotEligible,

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Insufficient funds for withdrawal: balance {balance}, requested {requested}")]
    InsufficientFunds { balance: Rials, requested: Rials },

    #[error(
        "Withdrawal of {requested} from balance {balance} would drop below the minimum of {minimum}"
    )]
    BelowMinimumBalance {
        balance: Rials,
        requested: Rials,
        minimum: Rials,
    },

    #[error("Invalid account details: {0}")]
    InvalidAccountDetails(String),

    #[error("Wallet was modified concurrently: {0}")]
    ConcurrentUpdate(String),

    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
}
