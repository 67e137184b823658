// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use chrono::NaiveDate;
use tempfile::TempDir;
use toman::application::{LedgerService, NewUser, Registration};
use toman::domain::{Rials, WalletId};

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(LedgerService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let service = LedgerService::init(db_path.to_str().unwrap()).await?;
    Ok((service, temp_dir))
}

/// Helper to parse a YYYY-MM-DD date
pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// Profile details for an adult account holder
pub fn adult_user(full_name: &str) -> NewUser {
    NewUser {
        full_name: full_name.to_string(),
        email: format!("{}@example.com", full_name.to_lowercase().replace(' ', ".")),
        phone_number: "09120000000".to_string(),
        date_of_birth: date("1990-04-02"),
    }
}

/// Register an adult holder with standard account details, returning
/// both the user and their wallet
pub async fn register_holder(service: &LedgerService, full_name: &str) -> Result<Registration> {
    let registration = service
        .register_user(
            adult_user(full_name),
            "1234567890".to_string(),
            "IR0123456789012345678901".to_string(),
        )
        .await?;
    Ok(registration)
}

/// Deposit enough to bring a wallet up to the target balance
pub async fn fund_wallet_to(
    service: &LedgerService,
    wallet_id: WalletId,
    target: Rials,
) -> Result<()> {
    let balance = service.get_balance(wallet_id).await?;
    if target > balance {
        service.deposit(wallet_id, target - balance).await?;
    }
    Ok(())
}
