use anyhow::{Context, Result};
use sqlx::{Sqlite, SqliteConnection};
use tracing::debug;

/// An open unit of work against the ledger database.
///
/// Returned by [`Repository::begin`](super::Repository::begin) and passed by
/// `&mut` to every mutating repository call. Consumed by exactly one of
/// [`commit`](Self::commit) or [`rollback`](Self::rollback). A handle that is
/// dropped without either (for example when the request future is cancelled)
/// is rolled back by the pool before its connection is reused.
pub struct LedgerTransaction {
    inner: sqlx::Transaction<'static, Sqlite>,
}

impl LedgerTransaction {
    pub(crate) fn new(inner: sqlx::Transaction<'static, Sqlite>) -> Self {
        Self { inner }
    }

    pub(crate) fn connection(&mut self) -> &mut SqliteConnection {
        &mut self.inner
    }

    /// Make every write performed under this transaction durable.
    pub async fn commit(self) -> Result<()> {
        self.inner
            .commit()
            .await
            .context("Failed to commit transaction")?;
        debug!("Transaction committed");
        Ok(())
    }

    /// Discard every write performed under this transaction.
    pub async fn rollback(self) -> Result<()> {
        self.inner
            .rollback()
            .await
            .context("Failed to roll back transaction")?;
        debug!("Transaction rolled back");
        Ok(())
    }
}
