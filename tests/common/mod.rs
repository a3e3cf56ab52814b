// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use ledger_api::application::LedgerService;
use ledger_api::domain::{Cents, UserId};
use ledger_api::storage::StorageConfig;
use sqlx::Row;
use tempfile::TempDir;

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(LedgerService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let config = StorageConfig::new(format!("sqlite:{}", db_path.display())).create_if_missing(true);
    let service = LedgerService::init(&config).await?;
    Ok((service, temp_dir))
}

/// Users are provisioned outside the ledger, so tests insert them directly.
pub async fn provision_user(service: &LedgerService, id: UserId, balance: Cents) -> Result<()> {
    sqlx::query("INSERT INTO users (id, balance) VALUES (?, ?)")
        .bind(id)
        .bind(balance)
        .execute(service.repository().pool())
        .await?;
    Ok(())
}

/// Read a user's committed balance outside of any ledger operation.
pub async fn balance_of(service: &LedgerService, id: UserId) -> Result<Cents> {
    let row = sqlx::query("SELECT balance FROM users WHERE id = ?")
        .bind(id)
        .fetch_one(service.repository().pool())
        .await?;
    Ok(row.get("balance"))
}

/// Every committed (amount, type) row for a user, oldest first, without the
/// history limit.
pub async fn log_of(service: &LedgerService, id: UserId) -> Result<Vec<(Cents, String)>> {
    let rows = sqlx::query("SELECT amount, type FROM transactions WHERE user_id = ? ORDER BY id")
        .bind(id)
        .fetch_all(service.repository().pool())
        .await?;
    Ok(rows
        .iter()
        .map(|row| (row.get("amount"), row.get("type")))
        .collect())
}

/// Total number of committed transaction rows.
pub async fn log_size(service: &LedgerService) -> Result<i64> {
    let row = sqlx::query("SELECT COUNT(*) AS count FROM transactions")
        .fetch_one(service.repository().pool())
        .await?;
    Ok(row.get("count"))
}

/// Test fixture: standard user setup
pub struct StandardUsers;

impl StandardUsers {
    pub const ALICE: UserId = 1;
    pub const BOB: UserId = 2;
    pub const CAROL: UserId = 3;

    /// Alice with 100.00, Bob with 100.00 and Carol with nothing
    pub async fn create(service: &LedgerService) -> Result<()> {
        provision_user(service, Self::ALICE, 10000).await?;
        provision_user(service, Self::BOB, 10000).await?;
        provision_user(service, Self::CAROL, 0).await?;
        Ok(())
    }
}
