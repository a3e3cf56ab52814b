mod ledger;
mod money;
mod transaction;
mod user;

pub use ledger::*;
pub use money::*;
pub use transaction::*;
pub use user::*;
