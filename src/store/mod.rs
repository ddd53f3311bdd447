//! Ledger Store
//!
//! Account persistence and the settlement primitive.
//! Both implementations guarantee that `send_money` checks the source balance
//! and applies the debit/credit pair inside one serialized scope.

mod error;
mod memory;
mod postgres;

use async_trait::async_trait;

use crate::domain::{Account, Amount, NewAccount};

pub use error::LedgerError;
pub use memory::MemoryLedgerStore;
pub use postgres::PgLedgerStore;

/// Storage collaborator for accounts and transfers
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Persist a new account, returning it with its assigned id.
    /// Fails with `DuplicateNumber` when the account number is taken.
    async fn create_account(&self, account: NewAccount) -> Result<Account, LedgerError>;

    /// Remove an account by internal id
    async fn delete_account(&self, id: i64) -> Result<(), LedgerError>;

    /// All accounts, ordered by id
    async fn get_accounts(&self) -> Result<Vec<Account>, LedgerError>;

    async fn get_account_by_id(&self, id: i64) -> Result<Account, LedgerError>;

    async fn get_account_by_number(&self, number: i64) -> Result<Account, LedgerError>;

    /// Atomically debit `from` and credit `to` by `amount`.
    ///
    /// Either both balances change or neither does. Existence and sufficient
    /// funds are re-checked under the same lock that applies the mutation.
    async fn send_money(&self, from: i64, to: i64, amount: Amount) -> Result<(), LedgerError>;
}
