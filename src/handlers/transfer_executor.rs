//! Transfer Executor
//!
//! Validates transfer preconditions and performs the settlement.

use std::sync::Arc;

use crate::domain::{Amount, DomainError};
use crate::error::AppError;
use crate::store::LedgerStore;

use super::{TransferCommand, TransferResult};

/// Executes transfers between accounts
pub struct TransferExecutor {
    store: Arc<dyn LedgerStore>,
}

impl TransferExecutor {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// Execute the transfer command
    ///
    /// The balance check here gives an early answer; the store repeats it
    /// under the settlement lock, which is what actually prevents overdraw.
    pub async fn execute(&self, command: TransferCommand) -> Result<TransferResult, AppError> {
        let amount = Amount::new(command.amount).map_err(DomainError::from)?;

        if command.from_account_number == command.to_account_number {
            return Err(DomainError::SameAccountTransfer.into());
        }

        let source = self
            .store
            .get_account_by_number(command.from_account_number)
            .await?;

        if source.balance < amount.value() {
            return Err(DomainError::insufficient_balance(amount.value(), source.balance).into());
        }

        self.store
            .get_account_by_number(command.to_account_number)
            .await?;

        self.store
            .send_money(command.from_account_number, command.to_account_number, amount)
            .await?;

        tracing::info!(
            from = command.from_account_number,
            to = command.to_account_number,
            amount = amount.value(),
            "Transfer completed"
        );

        Ok(TransferResult {
            message: format!(
                "Successfully transferred {} units to account {}",
                amount, command.to_account_number
            ),
        })
    }
}
