use super::{EntryType, LedgerEntry, MINIMUM_BALANCE, Rials, Wallet, WalletId};

/// Replay a wallet's ledger from the opening balance.
/// Every wallet opens at `MINIMUM_BALANCE`, so the stored balance must
/// equal the opening balance plus deposits minus withdrawals.
pub fn replay_balance(wallet_id: WalletId, entries: &[LedgerEntry]) -> Rials {
    entries
        .iter()
        .filter(|entry| entry.wallet_id == wallet_id)
        .fold(MINIMUM_BALANCE, |balance, entry| match entry.entry_type {
            EntryType::Deposit => balance + entry.amount,
            EntryType::Withdrawal => balance - entry.amount,
        })
}

/// Result of verifying the stored ledger against its own rules.
#[derive(Debug, Clone)]
pub struct IntegrityReport {
    pub user_count: i64,
    pub wallet_count: i64,
    pub entry_count: i64,
    /// Sum of all stored wallet balances
    pub total_balance: Rials,
    pub issues: Vec<String>,
}

impl IntegrityReport {
    pub fn is_healthy(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Build an integrity report for the full data set. `entries` must hold
/// every ledger entry for every wallet in `wallets`; `orphaned_entries`
/// and `invalid_amounts` come from storage-side checks.
pub fn build_integrity_report(
    wallets: &[Wallet],
    entries: &[LedgerEntry],
    user_count: i64,
    orphaned_entries: i64,
    invalid_amounts: i64,
) -> IntegrityReport {
    let mut issues = Vec::new();
    let mut total_balance: Rials = 0;

    for wallet in wallets {
        total_balance += wallet.balance;

        if wallet.balance < MINIMUM_BALANCE {
            issues.push(format!(
                "wallet {} balance {} is below the minimum of {}",
                wallet.id, wallet.balance, MINIMUM_BALANCE
            ));
        }

        let expected = replay_balance(wallet.id, entries);
        if wallet.balance != expected {
            issues.push(format!(
                "wallet {} balance {} does not match its ledger (replay gives {})",
                wallet.id, wallet.balance, expected
            ));
        }
    }

    if orphaned_entries > 0 {
        issues.push(format!(
            "{} ledger entries reference unknown wallets",
            orphaned_entries
        ));
    }
    if invalid_amounts > 0 {
        issues.push(format!(
            "{} ledger entries have non-positive amounts",
            invalid_amounts
        ));
    }

    IntegrityReport {
        user_count,
        wallet_count: wallets.len() as i64,
        entry_count: entries.len() as i64,
        total_balance,
        issues,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn sample_wallet() -> Wallet {
        Wallet::new(
            Uuid::new_v4(),
            "1234567890".to_string(),
            "IR0123456789012345678901".to_string(),
        )
    }

    #[test]
    fn test_replay_of_empty_ledger_is_the_opening_balance() {
        assert_eq!(replay_balance(Uuid::new_v4(), &[]), MINIMUM_BALANCE);
    }

    #[test]
    fn test_replay_applies_deposits_and_withdrawals() {
        let wallet_id = Uuid::new_v4();
        let entries = vec![
            LedgerEntry::new(wallet_id, EntryType::Deposit, 490_000),
            LedgerEntry::new(wallet_id, EntryType::Deposit, 150_000),
            LedgerEntry::new(wallet_id, EntryType::Withdrawal, 120_000),
        ];

        assert_eq!(
            replay_balance(wallet_id, &entries),
            MINIMUM_BALANCE + 490_000 + 150_000 - 120_000
        );
    }

    #[test]
    fn test_replay_ignores_other_wallets() {
        let wallet_id = Uuid::new_v4();
        let entries = vec![LedgerEntry::new(
            Uuid::new_v4(),
            EntryType::Deposit,
            500_000,
        )];

        assert_eq!(replay_balance(wallet_id, &entries), MINIMUM_BALANCE);
    }

    #[test]
    fn test_report_is_healthy_for_a_consistent_ledger() {
        let wallet = sample_wallet();
        let mut funded = sample_wallet();
        funded.balance = 160_000;
        let entries = vec![LedgerEntry::new(funded.id, EntryType::Deposit, 150_000)];

        let report = build_integrity_report(&[wallet, funded], &entries, 2, 0, 0);

        assert!(report.is_healthy(), "issues: {:?}", report.issues);
        assert_eq!(report.wallet_count, 2);
        assert_eq!(report.entry_count, 1);
        assert_eq!(report.total_balance, MINIMUM_BALANCE + 160_000);
    }

    #[test]
    fn test_report_flags_a_balance_below_the_floor() {
        let mut wallet = sample_wallet();
        wallet.balance = 5_000;

        let report = build_integrity_report(&[wallet], &[], 1, 0, 0);

        assert!(!report.is_healthy());
        assert!(
            report
                .issues
                .iter()
                .any(|issue| issue.contains("below the minimum"))
        );
    }

    #[test]
    fn test_report_flags_a_balance_that_does_not_match_its_ledger() {
        let mut wallet = sample_wallet();
        wallet.balance = 200_000;

        let report = build_integrity_report(&[wallet], &[], 1, 0, 0);

        assert!(!report.is_healthy());
        assert!(
            report
                .issues
                .iter()
                .any(|issue| issue.contains("does not match its ledger"))
        );
    }

    #[test]
    fn test_report_flags_storage_side_problems() {
        let report = build_integrity_report(&[], &[], 0, 2, 1);

        assert!(!report.is_healthy());
        assert_eq!(report.issues.len(), 2);
    }
}
