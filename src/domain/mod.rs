//! Domain module
//!
//! Core domain types and business logic.

pub mod account;
pub mod amount;
pub mod error;

pub use account::{Account, NewAccount};
pub use amount::{Amount, AmountError, Balance};
pub use error::DomainError;
