use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Cents, UserId};

pub type TransactionId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// External money credited to a single user
    TopUp,
    /// One leg of a movement between two users
    Transfer,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::TopUp => "topup",
            TransactionKind::Transfer => "transfer",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "topup" => Some(TransactionKind::TopUp),
            "transfer" => Some(TransactionKind::Transfer),
            _ => None,
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A committed, immutable row of the transaction log.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRecord {
    pub id: TransactionId,
    pub user_id: UserId,
    /// Signed amount in cents: positive for credits, negative for debits
    pub amount: Cents,
    pub kind: TransactionKind,
    pub created_at: DateTime<Utc>,
}

/// A transaction log row that has not been written yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerEntry {
    pub user_id: UserId,
    pub amount: Cents,
    pub kind: TransactionKind,
}

impl LedgerEntry {
    /// The single credit entry recorded for a top-up.
    pub fn top_up(user_id: UserId, amount: Cents) -> Self {
        debug_assert!(amount > 0, "Top-up amount must be positive");
        Self {
            user_id,
            amount,
            kind: TransactionKind::TopUp,
        }
    }

    /// The debit and credit entries recorded for a transfer, in that order.
    /// Their amounts always sum to zero.
    pub fn transfer_pair(from: UserId, to: UserId, amount: Cents) -> [Self; 2] {
        debug_assert!(amount > 0, "Transfer amount must be positive");
        [
            Self {
                user_id: from,
                amount: -amount,
                kind: TransactionKind::Transfer,
            },
            Self {
                user_id: to,
                amount,
                kind: TransactionKind::Transfer,
            },
        ]
    }
}
