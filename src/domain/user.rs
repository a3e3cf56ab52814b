use super::Cents;

pub type UserId = i64;

/// A ledger participant as observed inside a storage transaction.
///
/// Users are provisioned outside this service; the ledger only reads and
/// overwrites their balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    /// Current balance in cents, never negative
    pub balance: Cents,
}

impl User {
    pub fn new(id: UserId, balance: Cents) -> Self {
        Self { id, balance }
    }

    pub fn can_cover(&self, amount: Cents) -> bool {
        self.balance >= amount
    }
}
