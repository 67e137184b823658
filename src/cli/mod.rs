use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use uuid::Uuid;

use crate::application::{LedgerService, NewUser};
use crate::domain::{
    ENTRY_AMOUNT_MAX, ENTRY_AMOUNT_MIN, LedgerEntry, Rials, UserId, WalletId, format_rials,
    parse_rials,
};
use crate::io::Exporter;

/// Toman - Wallet & Transaction Ledger
#[derive(Parser)]
#[command(name = "toman")]
#[command(about = "A minimum-balance wallet and transaction ledger backed by SQLite")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, default_value = "toman.db")]
    pub database: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database
    Init,

    /// Register a user and open their wallet at the minimum balance
    Register {
        /// Full name of the account holder
        #[arg(long)]
        full_name: String,

        /// Contact email
        #[arg(long)]
        email: String,

        /// Contact phone number
        #[arg(long)]
        phone: String,

        /// Date of birth (YYYY-MM-DD); the holder must be at least 18
        #[arg(long)]
        date_of_birth: String,

        /// Bank account number
        #[arg(long)]
        account_number: String,

        /// SHABA number
        #[arg(long)]
        shaba_number: String,
    },

    /// Wallet management commands
    #[command(subcommand)]
    Wallet(WalletCommands),

    /// Deposit funds into a wallet
    Deposit {
        /// Wallet ID
        wallet: String,

        /// Amount in rials (e.g., "150000" or "150,000")
        amount: String,
    },

    /// Withdraw funds from a wallet
    Withdraw {
        /// Wallet ID
        wallet: String,

        /// Amount in rials (e.g., "150000" or "150,000")
        amount: String,
    },

    /// Show the current balance of a wallet
    Balance {
        /// Wallet ID
        wallet: String,
    },

    /// Check account credentials against a wallet
    Login {
        /// Wallet ID
        wallet: String,

        /// Bank account number
        #[arg(long)]
        account_number: String,

        /// SHABA number
        #[arg(long)]
        shaba_number: String,
    },

    /// List a wallet's ledger entries, oldest first
    Entries {
        /// Wallet ID
        wallet: String,
    },

    /// Verify ledger integrity
    Check,

    /// Export a wallet statement (CSV) or the full database (JSON)
    Export {
        /// Wallet ID (omit when using --all)
        wallet: Option<String>,

        /// Export the complete database as a JSON snapshot
        #[arg(long)]
        all: bool,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum WalletCommands {
    /// Open a wallet for an existing user
    Create {
        /// Owner user ID
        user: String,

        /// Bank account number
        #[arg(long)]
        account_number: String,

        /// SHABA number
        #[arg(long)]
        shaba_number: String,
    },

    /// List all wallets
    List,

    /// Show detailed wallet information
    Show {
        /// Wallet ID
        wallet: String,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Commands::Init => {
                LedgerService::init(&self.database).await?;
                println!("Database initialized: {}", self.database);
            }

            Commands::Register {
                full_name,
                email,
                phone,
                date_of_birth,
                account_number,
                shaba_number,
            } => {
                let service = LedgerService::connect(&self.database).await?;
                let date_of_birth = parse_birth_date(&date_of_birth)?;

                let registration = service
                    .register_user(
                        NewUser {
                            full_name,
                            email,
                            phone_number: phone,
                            date_of_birth,
                        },
                        account_number,
                        shaba_number,
                    )
                    .await?;

                println!("Registered user: {}", registration.user.id);
                println!(
                    "Opened wallet {} with balance {}",
                    registration.wallet.id,
                    format_rials(registration.wallet.balance)
                );
            }

            Commands::Wallet(wallet_cmd) => {
                let service = LedgerService::connect(&self.database).await?;
                run_wallet_command(&service, wallet_cmd).await?;
            }

            Commands::Deposit { wallet, amount } => {
                let service = LedgerService::connect(&self.database).await?;
                let wallet_id = parse_wallet_id(&wallet)?;
                let amount = parse_entry_amount(&amount)?;

                let entry = service.deposit(wallet_id, amount).await?;
                let balance = service.get_balance(wallet_id).await?;

                println!(
                    "Deposited {} into wallet {} ({})",
                    format_rials(entry.amount),
                    wallet_id,
                    entry.id
                );
                println!("New balance: {}", format_rials(balance));
            }

            Commands::Withdraw { wallet, amount } => {
                let service = LedgerService::connect(&self.database).await?;
                let wallet_id = parse_wallet_id(&wallet)?;
                let amount = parse_entry_amount(&amount)?;

                let entry = service.withdraw(wallet_id, amount).await?;
                let balance = service.get_balance(wallet_id).await?;

                println!(
                    "Withdrew {} from wallet {} ({})",
                    format_rials(entry.amount),
                    wallet_id,
                    entry.id
                );
                println!("New balance: {}", format_rials(balance));
            }

            Commands::Balance { wallet } => {
                let service = LedgerService::connect(&self.database).await?;
                let wallet_id = parse_wallet_id(&wallet)?;
                let balance = service.get_balance(wallet_id).await?;
                println!("Balance: {}", format_rials(balance));
            }

            Commands::Login {
                wallet,
                account_number,
                shaba_number,
            } => {
                let service = LedgerService::connect(&self.database).await?;
                let wallet_id = parse_wallet_id(&wallet)?;

                if service
                    .login(wallet_id, &account_number, &shaba_number)
                    .await?
                {
                    println!("Login successful!");
                } else {
                    println!("Login failed!");
                    std::process::exit(1);
                }
            }

            Commands::Entries { wallet } => {
                let service = LedgerService::connect(&self.database).await?;
                let wallet_id = parse_wallet_id(&wallet)?;
                run_entries_command(&service, wallet_id).await?;
            }

            Commands::Check => {
                let service = LedgerService::connect(&self.database).await?;
                run_check_command(&service).await?;
            }

            Commands::Export {
                wallet,
                all,
                output,
            } => {
                let service = LedgerService::connect(&self.database).await?;
                run_export_command(&service, wallet, all, output.as_deref()).await?;
            }
        }

        Ok(())
    }
}

async fn run_wallet_command(service: &LedgerService, command: WalletCommands) -> Result<()> {
    match command {
        WalletCommands::Create {
            user,
            account_number,
            shaba_number,
        } => {
            let owner_id = parse_user_id(&user)?;
            let wallet = service
                .create_wallet(owner_id, account_number, shaba_number)
                .await?;

            println!("Created wallet: {}", wallet.id);
            println!("  Owner:   {}", wallet.owner_id);
            println!("  Balance: {}", format_rials(wallet.balance));
        }

        WalletCommands::List => {
            let wallets = service.list_wallets().await?;

            if wallets.is_empty() {
                println!("No wallets found.");
            } else {
                println!(
                    "{:<36} {:<12} {:>14} {:<12}",
                    "ID", "ACCOUNT", "BALANCE", "CREATED"
                );
                println!("{}", "-".repeat(77));
                for wallet in &wallets {
                    println!(
                        "{:<36} {:<12} {:>14} {:<12}",
                        wallet.id.to_string(),
                        wallet.account_number,
                        format_rials(wallet.balance),
                        wallet.created_at.format("%Y-%m-%d").to_string()
                    );
                }
            }
        }

        WalletCommands::Show { wallet } => {
            let wallet_id = parse_wallet_id(&wallet)?;
            let overview = service.get_wallet_overview(wallet_id).await?;
            let wallet = &overview.wallet;

            println!("Wallet: {}", wallet.id);
            println!("  Owner:          {}", wallet.owner_id);
            println!("  Account number: {}", wallet.account_number);
            println!("  SHABA number:   {}", wallet.shaba_number);
            println!("  Balance:        {}", format_rials(wallet.balance));
            println!(
                "  Created:        {}",
                wallet.created_at.format("%Y-%m-%d %H:%M:%S")
            );
            println!();
            println!(
                "  Entries:        {} ({} deposits, {} withdrawals)",
                overview.deposit_count + overview.withdrawal_count,
                overview.deposit_count,
                overview.withdrawal_count
            );
            if let Some(last_activity) = overview.last_activity {
                println!(
                    "  Last activity:  {}",
                    last_activity.format("%Y-%m-%d %H:%M:%S")
                );
            }
        }
    }

    Ok(())
}

async fn run_entries_command(service: &LedgerService, wallet_id: WalletId) -> Result<()> {
    let entries = service.list_entries(wallet_id).await?;

    if entries.is_empty() {
        println!("No entries found.");
        return Ok(());
    }

    println!("{:<12} {:<12} {:>14} {:<36}", "DATE", "TYPE", "AMOUNT", "ID");
    println!("{}", "-".repeat(77));
    for entry in &entries {
        println!(
            "{:<12} {:<12} {:>14} {:<36}",
            entry.occurred_at.format("%Y-%m-%d").to_string(),
            entry.entry_type.as_str(),
            format_rials(entry.amount),
            entry.id.to_string()
        );
    }

    Ok(())
}

async fn run_check_command(service: &LedgerService) -> Result<()> {
    println!("Checking ledger integrity...\n");

    let report = service.check_integrity().await?;

    println!("Users:         {}", report.user_count);
    println!("Wallets:       {}", report.wallet_count);
    println!("Entries:       {}", report.entry_count);
    println!("Total balance: {}", format_rials(report.total_balance));
    println!();

    if report.is_healthy() {
        println!("Ledger is consistent.");
    } else {
        println!("Issues found:");
        for issue in &report.issues {
            println!("  - {}", issue);
        }
        anyhow::bail!("Ledger integrity check failed");
    }

    Ok(())
}

async fn run_export_command(
    service: &LedgerService,
    wallet: Option<String>,
    all: bool,
    output: Option<&str>,
) -> Result<()> {
    use std::fs::File;
    use std::io::{Write, stdout};

    let exporter = Exporter::new(service);

    let writer: Box<dyn Write> = match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path))?;
            Box::new(file)
        }
        None => Box::new(stdout()),
    };

    if all {
        let snapshot = exporter.export_full_json(writer).await?;
        if output.is_some() {
            eprintln!(
                "Exported full database: {} users, {} wallets, {} entries",
                snapshot.users.len(),
                snapshot.wallets.len(),
                snapshot.entries.len()
            );
        }
    } else {
        let wallet = wallet.ok_or_else(|| anyhow::anyhow!("Provide a wallet ID or use --all"))?;
        let wallet_id = parse_wallet_id(&wallet)?;
        let count = exporter.export_statement_csv(wallet_id, writer).await?;
        if output.is_some() {
            eprintln!("Exported {} entries", count);
        }
    }

    Ok(())
}

fn parse_wallet_id(input: &str) -> Result<WalletId> {
    Uuid::parse_str(input.trim()).context("Invalid wallet ID (expected a UUID)")
}

fn parse_user_id(input: &str) -> Result<UserId> {
    Uuid::parse_str(input.trim()).context("Invalid user ID (expected a UUID)")
}

fn parse_birth_date(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .context("Date of birth must be in YYYY-MM-DD format")
}

/// Parse an amount and enforce the per-operation bounds. The service
/// itself only requires positive amounts; the bounds are a request-layer
/// rule.
fn parse_entry_amount(input: &str) -> Result<Rials> {
    let amount =
        parse_rials(input).context("Invalid amount. Use digits, e.g. \"150000\" or \"150,000\"")?;

    if !LedgerEntry::amount_within_limits(amount) {
        anyhow::bail!(
            "Amount must be between {} and {} rials",
            format_rials(ENTRY_AMOUNT_MIN),
            format_rials(ENTRY_AMOUNT_MAX)
        );
    }

    Ok(amount)
}
