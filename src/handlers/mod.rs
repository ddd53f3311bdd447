//! Command Handlers module
//!
//! Handlers that orchestrate business operations against the ledger store.

mod account_handler;
mod commands;
mod login_handler;
mod transfer_executor;

pub use account_handler::CreateAccountHandler;
pub use commands::*;
pub use login_handler::LoginHandler;
pub use transfer_executor::TransferExecutor;
