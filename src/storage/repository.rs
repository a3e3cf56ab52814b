use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use tracing::debug;

use crate::domain::{
    Cents, LedgerEntry, TransactionId, TransactionKind, TransactionRecord, User, UserId,
};

use super::{LedgerTransaction, MIGRATION_001_INITIAL, StorageConfig};

/// `BEGIN IMMEDIATE` takes SQLite's write lock up front, so two units of work
/// that read and then rewrite the same balance run one after the other.
const BEGIN_WRITE: &str = "BEGIN IMMEDIATE";

/// Repository for reading and updating balances and the transaction log.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open a connection pool for the configured database.
    pub async fn connect(config: &StorageConfig) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(&config.url)
            .with_context(|| format!("Invalid database URL: {}", config.url))?
            .create_if_missing(config.create_if_missing)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(config.busy_timeout)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect_with(options)
            .await
            .context("Failed to connect to database")?;

        debug!(url = %config.url, max_connections = config.max_connections, "Connected to database");
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

    /// Initialize a database (connect + migrate).
    pub async fn init(config: &StorageConfig) -> Result<Self> {
        let repo = Self::connect(config).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    /// The underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Wait for checked-out connections to return and close the pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    // ========================
    // Unit of work
    // ========================

    /// Open a new write transaction.
    pub async fn begin(&self) -> Result<LedgerTransaction> {
        let tx = self
            .pool
            .begin_with(BEGIN_WRITE)
            .await
            .context("Failed to begin transaction")?;
        debug!("Transaction started");
        Ok(LedgerTransaction::new(tx))
    }

    // ========================
    // User operations
    // ========================

    /// Read a user's balance as seen by `tx`.
    pub async fn get_user(&self, tx: &mut LedgerTransaction, id: UserId) -> Result<Option<User>> {
        let row = sqlx::query("SELECT id, balance FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(tx.connection())
            .await
            .context("Failed to fetch user")?;

        Ok(row.map(|row| User::new(row.get("id"), row.get("balance"))))
    }

    /// Overwrite a user's balance within `tx`.
    pub async fn set_balance(
        &self,
        tx: &mut LedgerTransaction,
        id: UserId,
        balance: Cents,
    ) -> Result<()> {
        let result = sqlx::query("UPDATE users SET balance = ? WHERE id = ?")
            .bind(balance)
            .bind(id)
            .execute(tx.connection())
            .await
            .context("Failed to update balance")?;

        if result.rows_affected() != 1 {
            anyhow::bail!("Balance update for user {} affected no rows", id);
        }
        Ok(())
    }

    // ========================
    // Transaction log operations
    // ========================

    /// Append one immutable transaction record within `tx`.
    /// Returns the identifier assigned by the database.
    pub async fn append_transaction(
        &self,
        tx: &mut LedgerTransaction,
        entry: &LedgerEntry,
    ) -> Result<TransactionId> {
        let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);

        let result = sqlx::query(
            r#"
            INSERT INTO transactions (user_id, amount, type, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(entry.user_id)
        .bind(entry.amount)
        .bind(entry.kind.as_str())
        .bind(&created_at)
        .execute(tx.connection())
        .await
        .context("Failed to save transaction")?;

        Ok(result.last_insert_rowid())
    }

    /// List the most recent transactions for a user, newest first.
    pub async fn recent_transactions(
        &self,
        user_id: UserId,
        limit: u32,
    ) -> Result<Vec<TransactionRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, amount, type, created_at
            FROM transactions
            WHERE user_id = ?
            ORDER BY created_at DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list transactions")?;

        rows.iter().map(Self::row_to_record).collect()
    }

    fn row_to_record(row: &sqlx::sqlite::SqliteRow) -> Result<TransactionRecord> {
        let kind_str: String = row.get("type");
        let created_at_str: String = row.get("created_at");

        Ok(TransactionRecord {
            id: row.get("id"),
            user_id: row.get("user_id"),
            amount: row.get("amount"),
            kind: TransactionKind::from_str(&kind_str)
                .ok_or_else(|| anyhow::anyhow!("Invalid transaction type: {}", kind_str))?,
            created_at: DateTime::parse_from_rfc3339(&created_at_str)
                .context("Invalid created_at timestamp")?
                .with_timezone(&Utc),
        })
    }
}
