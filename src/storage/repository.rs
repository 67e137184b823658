use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{Row, Sqlite, SqlitePool, Transaction};
use uuid::Uuid;

use crate::domain::{EntryType, LedgerEntry, User, UserId, Wallet, WalletId};

use super::MIGRATION_001_INITIAL;

/// Storage-side statistics for ledger integrity verification.
#[derive(Debug, Clone)]
pub struct IntegrityStats {
    pub user_count: i64,
    pub orphaned_entries: i64,
    pub invalid_amounts: i64,
}

/// Repository for persisting and querying users, wallets and ledger entries.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database at the given path.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;

        Ok(())
    }

    /// Initialize a new database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    /// Begin a transaction spanning multiple statements.
    pub async fn begin(&self) -> Result<Transaction<'static, Sqlite>> {
        self.pool
            .begin()
            .await
            .context("Failed to begin transaction")
    }

    /// Commit a transaction. Dropping the transaction instead rolls it back.
    pub async fn commit(tx: Transaction<'static, Sqlite>) -> Result<()> {
        tx.commit().await.context("Failed to commit transaction")
    }

    // ========================
    // User operations
    // ========================

    /// Save a new user within an open transaction. Users are only ever
    /// created together with their wallet.
    pub async fn save_user_tx(tx: &mut Transaction<'static, Sqlite>, user: &User) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, full_name, email, phone_number, date_of_birth, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(user.id.to_string())
        .bind(&user.full_name)
        .bind(&user.email)
        .bind(&user.phone_number)
        .bind(user.date_of_birth.format("%Y-%m-%d").to_string())
        .bind(user.created_at.to_rfc3339())
        .execute(&mut **tx)
        .await
        .context("Failed to save user")?;
        Ok(())
    }

    /// Get a user by ID.
    pub async fn get_user(&self, id: UserId) -> Result<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, full_name, email, phone_number, date_of_birth, created_at
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch user")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_user(&row)?)),
            None => Ok(None),
        }
    }

    /// List all users, oldest first.
    pub async fn list_users(&self) -> Result<Vec<User>> {
        let rows = sqlx::query(
            r#"
            SELECT id, full_name, email, phone_number, date_of_birth, created_at
            FROM users
            ORDER BY created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list users")?;

        rows.iter().map(Self::row_to_user).collect()
    }

    // ========================
    // Wallet operations
    // ========================

    /// Save a new wallet to the database.
    pub async fn save_wallet(&self, wallet: &Wallet) -> Result<()> {
        let mut tx = self.begin().await?;
        Self::save_wallet_tx(&mut tx, wallet).await?;
        Self::commit(tx).await
    }

    /// Save a new wallet within an open transaction.
    pub async fn save_wallet_tx(
        tx: &mut Transaction<'static, Sqlite>,
        wallet: &Wallet,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO wallets (id, owner_id, account_number, shaba_number, balance, version, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(wallet.id.to_string())
        .bind(wallet.owner_id.to_string())
        .bind(&wallet.account_number)
        .bind(&wallet.shaba_number)
        .bind(wallet.balance)
        .bind(wallet.version)
        .bind(wallet.created_at.to_rfc3339())
        .execute(&mut **tx)
        .await
        .context("Failed to save wallet")?;
        Ok(())
    }

    /// Get a wallet by ID.
    pub async fn get_wallet(&self, id: WalletId) -> Result<Option<Wallet>> {
        let row = sqlx::query(
            r#"
            SELECT id, owner_id, account_number, shaba_number, balance, version, created_at
            FROM wallets
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch wallet")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_wallet(&row)?)),
            None => Ok(None),
        }
    }

    /// Get the wallet owned by a user.
    pub async fn get_wallet_by_owner(&self, owner_id: UserId) -> Result<Option<Wallet>> {
        let row = sqlx::query(
            r#"
            SELECT id, owner_id, account_number, shaba_number, balance, version, created_at
            FROM wallets
            WHERE owner_id = ?
            "#,
        )
        .bind(owner_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch wallet by owner")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_wallet(&row)?)),
            None => Ok(None),
        }
    }

    /// List all wallets, oldest first.
    pub async fn list_wallets(&self) -> Result<Vec<Wallet>> {
        let rows = sqlx::query(
            r#"
            SELECT id, owner_id, account_number, shaba_number, balance, version, created_at
            FROM wallets
            ORDER BY created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list wallets")?;

        rows.iter().map(Self::row_to_wallet).collect()
    }

    /// Write a wallet's new balance, guarded by the version the caller
    /// loaded. Returns false when the stored version no longer matches,
    /// meaning another writer committed first and nothing was changed.
    pub async fn update_wallet_balance_tx(
        tx: &mut Transaction<'static, Sqlite>,
        wallet: &Wallet,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE wallets
            SET balance = ?, version = version + 1
            WHERE id = ? AND version = ?
            "#,
        )
        .bind(wallet.balance)
        .bind(wallet.id.to_string())
        .bind(wallet.version)
        .execute(&mut **tx)
        .await
        .context("Failed to update wallet balance")?;

        Ok(result.rows_affected() == 1)
    }

    // ========================
    // Ledger entry operations
    // ========================

    /// Append a ledger entry within an open transaction. Entries are
    /// immutable; no update or delete exists.
    pub async fn save_entry_tx(
        tx: &mut Transaction<'static, Sqlite>,
        entry: &LedgerEntry,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO ledger_entries (id, wallet_id, entry_type, amount, occurred_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(entry.id.to_string())
        .bind(entry.wallet_id.to_string())
        .bind(entry.entry_type.as_str())
        .bind(entry.amount)
        .bind(entry.occurred_at.to_rfc3339())
        .execute(&mut **tx)
        .await
        .context("Failed to save ledger entry")?;
        Ok(())
    }

    /// List a wallet's ledger entries, oldest first.
    pub async fn list_entries_for_wallet(&self, wallet_id: WalletId) -> Result<Vec<LedgerEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT id, wallet_id, entry_type, amount, occurred_at
            FROM ledger_entries
            WHERE wallet_id = ?
            ORDER BY occurred_at, id
            "#,
        )
        .bind(wallet_id.to_string())
        .fetch_all(&self.pool)
        .await
        .context("Failed to list ledger entries")?;

        rows.iter().map(Self::row_to_entry).collect()
    }

    /// List every ledger entry, oldest first.
    pub async fn list_entries(&self) -> Result<Vec<LedgerEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT id, wallet_id, entry_type, amount, occurred_at
            FROM ledger_entries
            ORDER BY occurred_at, id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list ledger entries")?;

        rows.iter().map(Self::row_to_entry).collect()
    }

    /// Count a wallet's entries, split into (deposits, withdrawals).
    pub async fn count_entries_for_wallet(&self, wallet_id: WalletId) -> Result<(i64, i64)> {
        let row = sqlx::query(
            r#"
            SELECT
                COALESCE(SUM(CASE WHEN entry_type = 'deposit' THEN 1 ELSE 0 END), 0) as deposits,
                COALESCE(SUM(CASE WHEN entry_type = 'withdrawal' THEN 1 ELSE 0 END), 0) as withdrawals
            FROM ledger_entries
            WHERE wallet_id = ?
            "#,
        )
        .bind(wallet_id.to_string())
        .fetch_one(&self.pool)
        .await
        .context("Failed to count ledger entries")?;

        Ok((row.get("deposits"), row.get("withdrawals")))
    }

    /// Timestamp of a wallet's most recent entry, if any.
    pub async fn last_entry_at(&self, wallet_id: WalletId) -> Result<Option<DateTime<Utc>>> {
        let row = sqlx::query(
            r#"
            SELECT MAX(occurred_at) as last_entry
            FROM ledger_entries
            WHERE wallet_id = ?
            "#,
        )
        .bind(wallet_id.to_string())
        .fetch_one(&self.pool)
        .await
        .context("Failed to fetch last entry timestamp")?;

        let last_entry: Option<String> = row.get("last_entry");
        last_entry
            .map(|s| {
                DateTime::parse_from_rfc3339(&s)
                    .map(|dt| dt.with_timezone(&Utc))
                    .context("Invalid timestamp in database")
            })
            .transpose()
    }

    // ========================
    // Integrity operations
    // ========================

    /// Gather statistics for the integrity check.
    pub async fn get_integrity_stats(&self) -> Result<IntegrityStats> {
        let user_count: i64 = sqlx::query("SELECT COUNT(*) as count FROM users")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count users")?
            .get("count");

        let orphaned_entries: i64 = sqlx::query(
            r#"
            SELECT COUNT(*) as count
            FROM ledger_entries e
            WHERE NOT EXISTS (SELECT 1 FROM wallets w WHERE w.id = e.wallet_id)
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .context("Failed to count orphaned entries")?
        .get("count");

        let invalid_amounts: i64 =
            sqlx::query("SELECT COUNT(*) as count FROM ledger_entries WHERE amount <= 0")
                .fetch_one(&self.pool)
                .await
                .context("Failed to count invalid amounts")?
                .get("count");

        Ok(IntegrityStats {
            user_count,
            orphaned_entries,
            invalid_amounts,
        })
    }

    // ========================
    // Row mapping
    // ========================

    fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> Result<User> {
        let id_str: String = row.get("id");
        let date_of_birth_str: String = row.get("date_of_birth");
        let created_at_str: String = row.get("created_at");

        Ok(User {
            id: Uuid::parse_str(&id_str).context("Invalid UUID in database")?,
            full_name: row.get("full_name"),
            email: row.get("email"),
            phone_number: row.get("phone_number"),
            date_of_birth: NaiveDate::parse_from_str(&date_of_birth_str, "%Y-%m-%d")
                .context("Invalid date of birth in database")?,
            created_at: DateTime::parse_from_rfc3339(&created_at_str)
                .context("Invalid timestamp in database")?
                .with_timezone(&Utc),
        })
    }

    fn row_to_wallet(row: &sqlx::sqlite::SqliteRow) -> Result<Wallet> {
        let id_str: String = row.get("id");
        let owner_id_str: String = row.get("owner_id");
        let created_at_str: String = row.get("created_at");

        Ok(Wallet {
            id: Uuid::parse_str(&id_str).context("Invalid UUID in database")?,
            owner_id: Uuid::parse_str(&owner_id_str).context("Invalid UUID in database")?,
            account_number: row.get("account_number"),
            shaba_number: row.get("shaba_number"),
            balance: row.get("balance"),
            version: row.get("version"),
            created_at: DateTime::parse_from_rfc3339(&created_at_str)
                .context("Invalid timestamp in database")?
                .with_timezone(&Utc),
        })
    }

    fn row_to_entry(row: &sqlx::sqlite::SqliteRow) -> Result<LedgerEntry> {
        let id_str: String = row.get("id");
        let wallet_id_str: String = row.get("wallet_id");
        let entry_type_str: String = row.get("entry_type");
        let occurred_at_str: String = row.get("occurred_at");

        Ok(LedgerEntry {
            id: Uuid::parse_str(&id_str).context("Invalid UUID in database")?,
            wallet_id: Uuid::parse_str(&wallet_id_str).context("Invalid UUID in database")?,
            entry_type: EntryType::from_str(&entry_type_str)
                .ok_or_else(|| anyhow::anyhow!("Invalid entry type: {}", entry_type_str))?,
            amount: row.get("amount"),
            occurred_at: DateTime::parse_from_rfc3339(&occurred_at_str)
                .context("Invalid timestamp in database")?
                .with_timezone(&Utc),
        })
    }
}
