//! Login Handler
//!
//! Verifies credentials and issues an identity token.

use std::sync::Arc;

use crate::auth::TokenIssuer;
use crate::error::AppError;
use crate::store::LedgerStore;

use super::{LoginCommand, LoginResult};

/// Handler for credential login
pub struct LoginHandler {
    store: Arc<dyn LedgerStore>,
    issuer: TokenIssuer,
}

impl LoginHandler {
    pub fn new(store: Arc<dyn LedgerStore>, issuer: TokenIssuer) -> Self {
        Self { store, issuer }
    }

    /// Execute the login command
    ///
    /// Unknown account numbers and wrong passwords produce the same error.
    pub async fn execute(&self, command: LoginCommand) -> Result<LoginResult, AppError> {
        let account = match self.store.get_account_by_number(command.number).await {
            Ok(account) => account,
            Err(e) if e.is_not_found() => return Err(AppError::InvalidCredentials),
            Err(e) => return Err(e.into()),
        };

        let password = command.password;
        let (account, valid) = tokio::task::spawn_blocking(move || {
            let valid = account.valid_password(&password);
            (account, valid)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

        if !valid {
            tracing::warn!(number = account.number, "Login rejected: bad password");
            return Err(AppError::InvalidCredentials);
        }

        let token = self
            .issuer
            .issue(&account)
            .map_err(|e| AppError::Internal(e.to_string()))?;

        tracing::info!(number = account.number, "Login succeeded");

        Ok(LoginResult {
            token,
            number: account.number,
        })
    }
}
