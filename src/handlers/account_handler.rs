//! Account Handler
//!
//! Opens new accounts.

use std::sync::Arc;

use crate::domain::{Account, NewAccount};
use crate::error::AppError;
use crate::store::{LedgerError, LedgerStore};

use super::CreateAccountCommand;

/// Attempts at drawing a free account number before giving up
const MAX_NUMBER_ATTEMPTS: usize = 5;

/// Handler for account creation
pub struct CreateAccountHandler {
    store: Arc<dyn LedgerStore>,
}

impl CreateAccountHandler {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// Execute the create account command
    pub async fn execute(&self, command: CreateAccountCommand) -> Result<Account, AppError> {
        if command.first_name.trim().is_empty() || command.last_name.trim().is_empty() {
            return Err(AppError::InvalidRequest(
                "firstName and lastName are required".to_string(),
            ));
        }
        if command.password.is_empty() {
            return Err(AppError::InvalidRequest("password is required".to_string()));
        }

        // Argon2 is deliberately slow; keep it off the async workers
        let mut draft = tokio::task::spawn_blocking(move || {
            NewAccount::new(&command.first_name, &command.last_name, &command.password)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

        for _ in 0..MAX_NUMBER_ATTEMPTS {
            match self.store.create_account(draft.clone()).await {
                Ok(account) => {
                    tracing::info!(id = account.id, number = account.number, "Account created");
                    return Ok(account);
                }
                Err(LedgerError::DuplicateNumber(number)) => {
                    tracing::debug!(number, "Account number taken, drawing another");
                    draft.renumber();
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(AppError::Internal(
            "could not allocate a free account number".to_string(),
        ))
    }
}
