// Application layer - use cases and orchestration.
// Each money movement runs inside a single storage transaction.

pub mod error;
pub mod service;

pub use error::*;
pub use service::*;
