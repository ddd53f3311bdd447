//! Ledger Store Errors
//!
//! Error types for ledger storage operations.

/// Errors that can occur in the ledger store
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// No account with the given id or number
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    /// Source balance does not cover the amount
    #[error("Insufficient funds: required {required}, available {available}")]
    InsufficientFunds { required: i64, available: i64 },

    /// Account number already taken
    #[error("Account number already exists: {0}")]
    DuplicateNumber(i64),

    /// Balance arithmetic failed (overflow or negative result)
    #[error("Invalid balance: {0}")]
    InvalidBalance(#[from] crate::domain::AmountError),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl LedgerError {
    /// Check if this error means the account does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, LedgerError::AccountNotFound(_))
    }
}
