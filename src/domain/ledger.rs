use super::{Cents, User};

/// Balance after crediting `amount` to `balance`.
pub fn credit(balance: Cents, amount: Cents) -> Result<Cents, BalanceError> {
    balance
        .checked_add(amount)
        .ok_or(BalanceError::Overflow { balance, amount })
}

/// Balance after debiting `amount` from `balance`.
/// The result is never negative.
pub fn debit(balance: Cents, amount: Cents) -> Result<Cents, BalanceError> {
    if balance < amount {
        return Err(BalanceError::InsufficientFunds {
            balance,
            required: amount,
        });
    }
    Ok(balance - amount)
}

/// New balances for the source and destination of a transfer.
///
/// Funds are conserved: the sum of both balances is unchanged.
pub fn apply_transfer(
    from: &User,
    to: &User,
    amount: Cents,
) -> Result<(Cents, Cents), BalanceError> {
    let from_balance = debit(from.balance, amount)?;
    let to_balance = credit(to.balance, amount)?;
    Ok((from_balance, to_balance))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BalanceError {
    InsufficientFunds { balance: Cents, required: Cents },
    Overflow { balance: Cents, amount: Cents },
}

impl std::fmt::Display for BalanceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BalanceError::InsufficientFunds { balance, required } => write!(
                f,
                "Balance of {} cents cannot cover {} cents",
                balance, required
            ),
            BalanceError::Overflow { balance, amount } => write!(
                f,
                "Crediting {} cents to a balance of {} cents overflows",
                amount, balance
            ),
        }
    }
}

impl std::error::Error for BalanceError {}
