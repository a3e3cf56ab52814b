use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::application::LedgerService;
use crate::domain::{UserId, format_cents, parse_cents};
use crate::storage::StorageConfig;
use crate::{http, logging};

/// ledger-api - Balance ledger service
#[derive(Parser)]
#[command(name = "ledger-api")]
#[command(about = "A double-entry balance ledger served over HTTP")]
#[command(version)]
pub struct Cli {
    /// Database connection string
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://ledger.db", global = true)]
    pub database_url: String,

    /// Maximum number of pooled database connections
    #[arg(long, default_value_t = 10, global = true)]
    pub max_connections: u32,

    /// Seconds to wait for a free database connection
    #[arg(long, default_value_t = 30, global = true)]
    pub acquire_timeout_secs: u64,

    /// Seconds a statement waits on a locked database
    #[arg(long, default_value_t = 5, global = true)]
    pub busy_timeout_secs: u64,

    /// Log filter used when RUST_LOG is not set (e.g. "info", "ledger_api=debug")
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the database and its schema
    Init,

    /// Run the HTTP API
    Serve {
        /// Address to listen on
        #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:8080")]
        listen: SocketAddr,
    },

    /// Credit a user's balance
    TopUp {
        /// User ID
        user: UserId,

        /// Amount to credit (e.g., "50.00" or "50")
        #[arg(allow_hyphen_values = true)]
        amount: String,
    },

    /// Move funds between two users
    Transfer {
        /// Amount to transfer (e.g., "50.00" or "50")
        #[arg(allow_hyphen_values = true)]
        amount: String,

        /// Source user ID
        #[arg(long)]
        from: UserId,

        /// Destination user ID
        #[arg(long)]
        to: UserId,
    },

    /// List a user's most recent transactions
    History {
        /// User ID
        user: UserId,
    },
}

impl Cli {
    /// The storage settings selected on the command line.
    pub fn storage_config(&self) -> StorageConfig {
        StorageConfig::new(&self.database_url)
            .with_max_connections(self.max_connections)
            .with_acquire_timeout(Duration::from_secs(self.acquire_timeout_secs))
            .with_busy_timeout(Duration::from_secs(self.busy_timeout_secs))
    }

    pub async fn run(self) -> Result<()> {
        logging::init(&self.log_level);
        let config = self.storage_config();

        match self.command {
            Commands::Init => {
                LedgerService::init(&config.create_if_missing(true)).await?;
                println!("Database initialized: {}", self.database_url);
            }

            Commands::Serve { listen } => {
                let service = LedgerService::init(&config).await?;
                http::serve(service, listen).await?;
            }

            Commands::TopUp { user, amount } => {
                let service = LedgerService::connect(&config).await?;
                let amount_cents =
                    parse_cents(&amount).context("Invalid amount format. Use '50.00' or '50'")?;

                let result = service.top_up(user, amount_cents).await?;

                println!(
                    "Topped up user {} by {}: balance {}",
                    result.user_id,
                    format_cents(amount_cents),
                    format_cents(result.balance)
                );
                service.close().await;
            }

            Commands::Transfer { amount, from, to } => {
                let service = LedgerService::connect(&config).await?;
                let amount_cents =
                    parse_cents(&amount).context("Invalid amount format. Use '50.00' or '50'")?;

                let result = service.transfer(from, to, amount_cents).await?;

                println!(
                    "Transferred {} from user {} to user {}",
                    format_cents(result.amount),
                    result.from_user_id,
                    result.to_user_id
                );
                println!(
                    "Balances: user {} {}, user {} {}",
                    result.from_user_id,
                    format_cents(result.from_balance),
                    result.to_user_id,
                    format_cents(result.to_balance)
                );
                service.close().await;
            }

            Commands::History { user } => {
                let service = LedgerService::connect(&config).await?;
                run_history_command(&service, user).await?;
                service.close().await;
            }
        }

        Ok(())
    }
}

async fn run_history_command(service: &LedgerService, user: UserId) -> Result<()> {
    let records = service.recent_transactions(user).await?;

    if records.is_empty() {
        println!("No transactions found.");
        return Ok(());
    }

    println!("{:<22} {:>12} {:<10} ID", "DATE", "AMOUNT", "TYPE");
    println!("{}", "-".repeat(56));
    for record in records {
        println!(
            "{:<22} {:>12} {:<10} {}",
            record.created_at.format("%Y-%m-%d %H:%M:%S"),
            format_cents(record.amount),
            record.kind,
            record.id
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_transfer_command() {
        let cli = Cli::try_parse_from([
            "ledger-api",
            "--database-url",
            "sqlite://test.db",
            "transfer",
            "50.00",
            "--from",
            "1",
            "--to",
            "2",
        ])
        .unwrap();

        assert_eq!(cli.database_url, "sqlite://test.db");
        assert!(matches!(
            cli.command,
            Commands::Transfer { ref amount, from: 1, to: 2 } if amount == "50.00"
        ));
    }

    #[test]
    fn parses_negative_top_up_amount() {
        let cli = Cli::try_parse_from(["ledger-api", "top-up", "7", "-5"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::TopUp { user: 7, ref amount } if amount == "-5"
        ));
    }

    #[test]
    fn storage_config_from_flags() {
        let cli = Cli::try_parse_from([
            "ledger-api",
            "--max-connections",
            "4",
            "--busy-timeout-secs",
            "2",
            "history",
            "1",
        ])
        .unwrap();

        let config = cli.storage_config();
        assert_eq!(config.max_connections, 4);
        assert_eq!(config.busy_timeout, Duration::from_secs(2));
        assert_eq!(config.acquire_timeout, Duration::from_secs(30));
        assert!(!config.create_if_missing);
    }

    #[test]
    fn serve_listen_address() {
        let cli = Cli::try_parse_from(["ledger-api", "serve", "--listen", "127.0.0.1:9000"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Serve { listen } if listen == "127.0.0.1:9000".parse::<SocketAddr>().unwrap()
        ));
    }
}
