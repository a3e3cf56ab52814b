//! The API endpoint URIs.

use crate::domain::UserId;

/// Credit a user's balance.
pub const TOP_UP: &str = "/topup";
/// Move funds between two users.
pub const TRANSFER: &str = "/transfer";
/// List a user's most recent transactions.
pub const TRANSACTIONS: &str = "/transactions/{user_id}";

/// Fill in the user ID of [TRANSACTIONS].
pub fn transactions_for(user_id: UserId) -> String {
    TRANSACTIONS.replace("{user_id}", &user_id.to_string())
}
