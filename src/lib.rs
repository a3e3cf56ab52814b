//! A small balance ledger: top-ups, transfers between users and recent
//! transaction history, each money movement applied inside a single database
//! transaction and served over HTTP.

pub mod application;
pub mod cli;
pub mod domain;
pub mod http;
pub mod logging;
pub mod storage;

pub use domain::*;
pub use storage::Repository;
