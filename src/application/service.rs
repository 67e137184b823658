use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::{
    EntryType, IntegrityReport, LedgerEntry, MINIMUM_BALANCE, Rials, User, UserId, Wallet,
    WalletError, WalletId, build_integrity_report,
};
use crate::storage::Repository;

use super::error::AppError;

/// Application service providing high-level operations for the wallet
/// ledger. This is the primary interface for any client (CLI, API, etc.).
pub struct LedgerService {
    repo: Repository,
}

/// Profile details for registering a new account holder.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub date_of_birth: NaiveDate,
}

/// Result of a registration: the stored user and their opened wallet.
#[derive(Debug, Clone)]
pub struct Registration {
    pub user: User,
    pub wallet: Wallet,
}

/// A wallet together with its ledger activity counters.
#[derive(Debug, Clone)]
pub struct WalletOverview {
    pub wallet: Wallet,
    pub deposit_count: i64,
    pub withdrawal_count: i64,
    pub last_activity: Option<DateTime<Utc>>,
}

impl LedgerService {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Initialize a new database at the given path.
    pub async fn init(database_path: &str) -> Result<Self, AppError> {
        let database_url = format!("sqlite:{}?mode=rwc", database_path);
        let repo = Repository::init(&database_url).await?;
        Ok(Self::new(repo))
    }

    /// Connect to an existing database.
    pub async fn connect(database_path: &str) -> Result<Self, AppError> {
        let database_url = format!("sqlite:{}", database_path);
        let repo = Repository::connect(&database_url).await?;
        Ok(Self::new(repo))
    }

    // ========================
    // Account operations
    // ========================

    /// Register a new user and open their wallet at the minimum balance.
    /// Both records are persisted in a single transaction.
    pub async fn register_user(
        &self,
        details: NewUser,
        account_number: String,
        shaba_number: String,
    ) -> Result<Registration, AppError> {
        validate_account_details(&account_number, &shaba_number)?;

        let user = User::new(
            details.full_name,
            details.email,
            details.phone_number,
            details.date_of_birth,
        );
        if !user.is_eligible(Utc::now().date_naive()) {
            return Err(AppError::UserNotEligible);
        }

        let wallet = Wallet::new(user.id, account_number, shaba_number);

        let mut tx = self.repo.begin().await?;
        Repository::save_user_tx(&mut tx, &user).await?;
        Repository::save_wallet_tx(&mut tx, &wallet).await?;
        Repository::commit(tx).await?;

        tracing::info!("Registered user {} with wallet {}", user.id, wallet.id);
        Ok(Registration { user, wallet })
    }

    /// Get a user by id.
    pub async fn get_user(&self, user_id: UserId) -> Result<User, AppError> {
        self.repo
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::UserNotFound(user_id.to_string()))
    }

    // ========================
    // Wallet operations
    // ========================

    /// Open a wallet for an existing user. Each user may hold one wallet.
    pub async fn create_wallet(
        &self,
        owner_id: UserId,
        account_number: String,
        shaba_number: String,
    ) -> Result<Wallet, AppError> {
        validate_account_details(&account_number, &shaba_number)?;

        if self.repo.get_user(owner_id).await?.is_none() {
            return Err(AppError::UserNotFound(owner_id.to_string()));
        }
        if self.repo.get_wallet_by_owner(owner_id).await?.is_some() {
            return Err(AppError::WalletAlreadyExists(owner_id.to_string()));
        }

        let wallet = Wallet::new(owner_id, account_number, shaba_number);
        self.repo.save_wallet(&wallet).await?;

        tracing::info!("Created wallet {} for user {}", wallet.id, owner_id);
        Ok(wallet)
    }

    /// Get a wallet by id.
    pub async fn get_wallet_details(&self, wallet_id: WalletId) -> Result<Wallet, AppError> {
        self.repo
            .get_wallet(wallet_id)
            .await?
            .ok_or_else(|| AppError::WalletNotFound(wallet_id.to_string()))
    }

    /// Get the wallet owned by a user.
    pub async fn get_wallet_by_user(&self, user_id: UserId) -> Result<Wallet, AppError> {
        self.repo
            .get_wallet_by_owner(user_id)
            .await?
            .ok_or_else(|| AppError::WalletNotFound(format!("no wallet for user {}", user_id)))
    }

    /// Current balance of a wallet.
    pub async fn get_balance(&self, wallet_id: WalletId) -> Result<Rials, AppError> {
        Ok(self.get_wallet_details(wallet_id).await?.balance)
    }

    /// List all wallets, oldest first.
    pub async fn list_wallets(&self) -> Result<Vec<Wallet>, AppError> {
        Ok(self.repo.list_wallets().await?)
    }

    /// A wallet plus its ledger activity counters.
    pub async fn get_wallet_overview(
        &self,
        wallet_id: WalletId,
    ) -> Result<WalletOverview, AppError> {
        let wallet = self.get_wallet_details(wallet_id).await?;
        let (deposit_count, withdrawal_count) =
            self.repo.count_entries_for_wallet(wallet_id).await?;
        let last_activity = self.repo.last_entry_at(wallet_id).await?;

        Ok(WalletOverview {
            wallet,
            deposit_count,
            withdrawal_count,
            last_activity,
        })
    }

    /// Check the supplied identifiers against a wallet's stored pair.
    /// Pure equality check; no session or token is produced.
    pub async fn login(
        &self,
        wallet_id: WalletId,
        account_number: &str,
        shaba_number: &str,
    ) -> Result<bool, AppError> {
        let wallet = self.get_wallet_details(wallet_id).await?;
        let authenticated = wallet.authenticate(account_number, shaba_number);

        if authenticated {
            tracing::info!("Successful login for wallet {}", wallet_id);
        } else {
            tracing::warn!("Failed login attempt for wallet {}", wallet_id);
        }
        Ok(authenticated)
    }

    // ========================
    // Ledger operations
    // ========================

    /// Deposit funds into a wallet, recording a ledger entry.
    pub async fn deposit(
        &self,
        wallet_id: WalletId,
        amount: Rials,
    ) -> Result<LedgerEntry, AppError> {
        if amount < 0 {
            return Err(AppError::InvalidAmount(
                "Amount must be positive".to_string(),
            ));
        }

        let mut wallet = self.get_wallet_details(wallet_id).await?;
        wallet
            .add_funds(amount)
            .map_err(|err| map_wallet_error(&wallet, amount, err))?;

        let entry = LedgerEntry::new(wallet.id, EntryType::Deposit, amount);
        self.persist_operation(&wallet, &entry).await?;

        tracing::info!(
            "Deposited {} into wallet {}. New balance: {}",
            amount,
            wallet.id,
            wallet.balance
        );
        Ok(entry)
    }

    /// Withdraw funds from a wallet, recording a ledger entry. The raw
    /// balance is checked before the minimum-balance floor, so overdrawing
    /// reports `InsufficientFunds` rather than `BelowMinimumBalance`.
    pub async fn withdraw(
        &self,
        wallet_id: WalletId,
        amount: Rials,
    ) -> Result<LedgerEntry, AppError> {
        if amount < 0 {
            return Err(AppError::InvalidAmount(
                "Amount must be positive".to_string(),
            ));
        }

        let mut wallet = self.get_wallet_details(wallet_id).await?;
        if wallet.balance < amount {
            return Err(AppError::InsufficientFunds {
                balance: wallet.balance,
                requested: amount,
            });
        }
        wallet
            .withdraw_funds(amount)
            .map_err(|err| map_wallet_error(&wallet, amount, err))?;

        let entry = LedgerEntry::new(wallet.id, EntryType::Withdrawal, amount);
        self.persist_operation(&wallet, &entry).await?;

        tracing::info!(
            "Withdrew {} from wallet {}. New balance: {}",
            amount,
            wallet.id,
            wallet.balance
        );
        Ok(entry)
    }

    /// Ledger history of a wallet, oldest first. Unknown ids surface
    /// `WalletNotFound` rather than an empty history.
    pub async fn list_entries(&self, wallet_id: WalletId) -> Result<Vec<LedgerEntry>, AppError> {
        self.get_wallet_details(wallet_id).await?;
        Ok(self.repo.list_entries_for_wallet(wallet_id).await?)
    }

    /// Every ledger entry in the database, oldest first.
    pub async fn list_all_entries(&self) -> Result<Vec<LedgerEntry>, AppError> {
        Ok(self.repo.list_entries().await?)
    }

    /// All registered users, oldest first.
    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        Ok(self.repo.list_users().await?)
    }

    // ========================
    // Integrity operations
    // ========================

    /// Verify the stored data against the ledger rules.
    pub async fn check_integrity(&self) -> Result<IntegrityReport, AppError> {
        let stats = self.repo.get_integrity_stats().await?;
        let wallets = self.repo.list_wallets().await?;
        let entries = self.repo.list_entries().await?;

        Ok(build_integrity_report(
            &wallets,
            &entries,
            stats.user_count,
            stats.orphaned_entries,
            stats.invalid_amounts,
        ))
    }

    /// Commit a mutated wallet and its new ledger entry as one unit.
    /// The balance update is version-guarded; losing the race to another
    /// writer rolls the whole operation back.
    async fn persist_operation(
        &self,
        wallet: &Wallet,
        entry: &LedgerEntry,
    ) -> Result<(), AppError> {
        let mut tx = self.repo.begin().await?;

        let updated = Repository::update_wallet_balance_tx(&mut tx, wallet).await?;
        if !updated {
            return Err(AppError::ConcurrentUpdate(wallet.id.to_string()));
        }
        Repository::save_entry_tx(&mut tx, entry).await?;

        Repository::commit(tx).await?;
        Ok(())
    }
}

fn validate_account_details(account_number: &str, shaba_number: &str) -> Result<(), AppError> {
    if account_number.trim().is_empty() {
        return Err(AppError::InvalidAccountDetails(
            "Account number cannot be empty".to_string(),
        ));
    }
    if shaba_number.trim().is_empty() {
        return Err(AppError::InvalidAccountDetails(
            "SHABA number cannot be empty".to_string(),
        ));
    }
    Ok(())
}

fn map_wallet_error(wallet: &Wallet, requested: Rials, err: WalletError) -> AppError {
    match err {
        WalletError::NonPositiveAmount => {
            AppError::InvalidAmount("Amount must be positive".to_string())
        }
        WalletError::BelowMinimumBalance => AppError::BelowMinimumBalance {
            balance: wallet.balance,
            requested,
            minimum: MINIMUM_BALANCE,
        },
    }
}
