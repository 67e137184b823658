use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::application::LedgerService;
use crate::domain::{LedgerEntry, User, Wallet, WalletId};

/// Database snapshot for full export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSnapshot {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub users: Vec<User>,
    pub wallets: Vec<Wallet>,
    pub entries: Vec<LedgerEntry>,
}

/// Exporter for converting ledger data to statement and snapshot formats
pub struct Exporter<'a> {
    service: &'a LedgerService,
}

impl<'a> Exporter<'a> {
    pub fn new(service: &'a LedgerService) -> Self {
        Self { service }
    }

    /// Export one wallet's statement (its ledger entries) to CSV format.
    /// Returns the number of entries written.
    pub async fn export_statement_csv<W: Write>(
        &self,
        wallet_id: WalletId,
        writer: W,
    ) -> Result<usize> {
        let entries = self.service.list_entries(wallet_id).await?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        // Write header
        csv_writer.write_record(["id", "occurred_at", "entry_type", "amount"])?;

        let mut count = 0;
        for entry in &entries {
            csv_writer.write_record(&[
                entry.id.to_string(),
                entry.occurred_at.to_rfc3339(),
                entry.entry_type.to_string(),
                entry.amount.to_string(),
            ])?;
            count += 1;
        }

        csv_writer.flush()?;
        Ok(count)
    }

    /// Export the complete database as a JSON snapshot.
    pub async fn export_full_json<W: Write>(&self, mut writer: W) -> Result<DatabaseSnapshot> {
        let users = self.service.list_users().await?;
        let wallets = self.service.list_wallets().await?;
        let entries = self.service.list_all_entries().await?;

        let snapshot = DatabaseSnapshot {
            version: env!("CARGO_PKG_VERSION").to_string(),
            exported_at: Utc::now(),
            users,
            wallets,
            entries,
        };

        let json = serde_json::to_string_pretty(&snapshot)?;
        writer.write_all(json.as_bytes())?;
        writer.flush()?;

        Ok(snapshot)
    }
}
