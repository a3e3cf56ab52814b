use tracing::{info, warn};

use crate::domain::{
    apply_transfer, credit, BalanceError, Cents, LedgerEntry, TransactionRecord, UserId,
};
use crate::storage::{LedgerTransaction, Repository, StorageConfig};

use super::AppError;

/// Maximum number of records returned by [`LedgerService::recent_transactions`].
pub const RECENT_TRANSACTIONS_LIMIT: u32 = 10;

/// Application service providing the money-movement operations of the ledger.
/// This is the primary interface for any client (HTTP handlers, CLI, tests).
#[derive(Clone)]
pub struct LedgerService {
    repo: Repository,
}

/// Result of a committed top-up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopUpResult {
    pub user_id: UserId,
    pub balance: Cents,
}

/// Result of a committed transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferResult {
    pub from_user_id: UserId,
    pub to_user_id: UserId,
    pub amount: Cents,
    pub from_balance: Cents,
    pub to_balance: Cents,
}

impl LedgerService {
    /// Create a new ledger service with the given repository.
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Connect to the database and create the schema if needed.
    pub async fn init(config: &StorageConfig) -> Result<Self, AppError> {
        let repo = Repository::init(config).await.map_err(AppError::Connection)?;
        Ok(Self::new(repo))
    }

    /// Connect to an existing database.
    pub async fn connect(config: &StorageConfig) -> Result<Self, AppError> {
        let repo = Repository::connect(config)
            .await
            .map_err(AppError::Connection)?;
        Ok(Self::new(repo))
    }

    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    /// Close the underlying connection pool.
    pub async fn close(&self) {
        self.repo.close().await;
    }

    // ========================
    // Money movement
    // ========================

    /// Credit `amount` cents to a user's balance.
    pub async fn top_up(&self, user_id: UserId, amount: Cents) -> Result<TopUpResult, AppError> {
        if amount <= 0 {
            return Err(AppError::non_positive_amount());
        }

        let mut tx = self.begin().await?;
        let result = self.top_up_in(&mut tx, user_id, amount).await;
        let result = finish(tx, result).await?;

        info!(user_id, amount, balance = result.balance, "Balance topped up");
        Ok(result)
    }

    async fn top_up_in(
        &self,
        tx: &mut LedgerTransaction,
        user_id: UserId,
        amount: Cents,
    ) -> Result<TopUpResult, AppError> {
        let user = self
            .repo
            .get_user(tx, user_id)
            .await?
            .ok_or(AppError::UserNotFound(user_id))?;

        let balance =
            credit(user.balance, amount).map_err(|e| AppError::from_balance(user_id, e))?;

        self.repo.set_balance(tx, user_id, balance).await?;
        self.repo
            .append_transaction(tx, &LedgerEntry::top_up(user_id, amount))
            .await?;

        Ok(TopUpResult { user_id, balance })
    }

    /// Move `amount` cents from one user to another.
    pub async fn transfer(
        &self,
        from_user_id: UserId,
        to_user_id: UserId,
        amount: Cents,
    ) -> Result<TransferResult, AppError> {
        if amount <= 0 {
            return Err(AppError::non_positive_amount());
        }
        if from_user_id == to_user_id {
            return Err(AppError::SameUser);
        }

        let mut tx = self.begin().await?;
        let result = self
            .transfer_in(&mut tx, from_user_id, to_user_id, amount)
            .await;
        let result = finish(tx, result).await?;

        info!(
            from_user_id,
            to_user_id,
            amount,
            from_balance = result.from_balance,
            to_balance = result.to_balance,
            "Transfer completed"
        );
        Ok(result)
    }

    async fn transfer_in(
        &self,
        tx: &mut LedgerTransaction,
        from_user_id: UserId,
        to_user_id: UserId,
        amount: Cents,
    ) -> Result<TransferResult, AppError> {
        let from = self
            .repo
            .get_user(tx, from_user_id)
            .await?
            .ok_or(AppError::UserNotFound(from_user_id))?;
        let to = self
            .repo
            .get_user(tx, to_user_id)
            .await?
            .ok_or(AppError::UserNotFound(to_user_id))?;

        // Only the source can run dry and only the destination can overflow
        let (from_balance, to_balance) =
            apply_transfer(&from, &to, amount).map_err(|e| match e {
                BalanceError::InsufficientFunds { .. } => AppError::from_balance(from_user_id, e),
                BalanceError::Overflow { .. } => AppError::from_balance(to_user_id, e),
            })?;

        self.repo.set_balance(tx, from_user_id, from_balance).await?;
        self.repo.set_balance(tx, to_user_id, to_balance).await?;

        for entry in LedgerEntry::transfer_pair(from_user_id, to_user_id, amount) {
            self.repo.append_transaction(tx, &entry).await?;
        }

        Ok(TransferResult {
            from_user_id,
            to_user_id,
            amount,
            from_balance,
            to_balance,
        })
    }

    // ========================
    // History
    // ========================

    /// The most recent transactions of a user, newest first.
    pub async fn recent_transactions(
        &self,
        user_id: UserId,
    ) -> Result<Vec<TransactionRecord>, AppError> {
        Ok(self
            .repo
            .recent_transactions(user_id, RECENT_TRANSACTIONS_LIMIT)
            .await?)
    }

    async fn begin(&self) -> Result<LedgerTransaction, AppError> {
        self.repo.begin().await.map_err(AppError::Connection)
    }
}

/// Commit `tx` when the work succeeded, otherwise roll it back.
///
/// A rollback failure is logged and the original error is returned.
async fn finish<T>(tx: LedgerTransaction, result: Result<T, AppError>) -> Result<T, AppError> {
    match result {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                warn!(error = %err, rollback_error = ?rollback_err, "Rollback failed");
            }
            Err(err)
        }
    }
}
