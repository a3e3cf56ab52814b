use thiserror::Error;

use crate::domain::{BalanceError, Cents, ParseCentsError, UserId};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    InvalidAmount(String),

    #[error("cannot transfer to the same user")]
    SameUser,

    #[error("insufficient funds for user {user_id}")]
    InsufficientFunds {
        user_id: UserId,
        balance: Cents,
        required: Cents,
    },

    #[error("user {0} not found")]
    UserNotFound(UserId),

    #[error("Database unavailable: {0:#}")]
    Connection(#[source] anyhow::Error),

    #[error("Database error: {0:#}")]
    Database(#[from] anyhow::Error),
}

impl AppError {
    pub fn non_positive_amount() -> Self {
        AppError::InvalidAmount("amount must be positive".to_string())
    }

    /// Map a failed balance computation for `user_id` into an application error.
    pub fn from_balance(user_id: UserId, err: BalanceError) -> Self {
        match err {
            BalanceError::InsufficientFunds { balance, required } => AppError::InsufficientFunds {
                user_id,
                balance,
                required,
            },
            BalanceError::Overflow { .. } => {
                AppError::InvalidAmount(format!("amount would overflow the balance of user {}", user_id))
            }
        }
    }

    /// True for validation and business-rule failures caused by the request
    /// itself, false for storage failures.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, AppError::Connection(_) | AppError::Database(_))
    }
}

impl From<ParseCentsError> for AppError {
    fn from(err: ParseCentsError) -> Self {
        AppError::InvalidAmount(format!("invalid amount: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(AppError::non_positive_amount().to_string(), "amount must be positive");
        assert_eq!(AppError::SameUser.to_string(), "cannot transfer to the same user");
        assert_eq!(AppError::UserNotFound(42).to_string(), "user 42 not found");
        assert_eq!(
            AppError::InsufficientFunds {
                user_id: 1,
                balance: 2000,
                required: 5000
            }
            .to_string(),
            "insufficient funds for user 1"
        );
    }

    #[test]
    fn test_from_balance_error() {
        let err = AppError::from_balance(
            3,
            BalanceError::InsufficientFunds {
                balance: 1,
                required: 2,
            },
        );
        assert!(matches!(err, AppError::InsufficientFunds { user_id: 3, .. }));

        let err = AppError::from_balance(
            3,
            BalanceError::Overflow {
                balance: i64::MAX,
                amount: 1,
            },
        );
        assert!(matches!(err, AppError::InvalidAmount(_)));
    }

    #[test]
    fn test_client_error_classification() {
        assert!(AppError::SameUser.is_client_error());
        assert!(AppError::UserNotFound(1).is_client_error());
        assert!(AppError::non_positive_amount().is_client_error());
        assert!(!AppError::Database(anyhow::anyhow!("disk I/O error")).is_client_error());
        assert!(!AppError::Connection(anyhow::anyhow!("pool timed out")).is_client_error());
    }
}
