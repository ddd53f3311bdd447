//! Command definitions
//!
//! Commands represent intentions to change the system state. They are
//! decoded straight from request bodies; results are returned as responses.

use serde::{Deserialize, Serialize};

// =========================================================================
// CreateAccountCommand
// =========================================================================

/// Command to open a new account
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountCommand {
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

impl CreateAccountCommand {
    pub fn new(first_name: String, last_name: String, password: String) -> Self {
        Self {
            first_name,
            last_name,
            password,
        }
    }
}

// =========================================================================
// LoginCommand
// =========================================================================

/// Command to exchange credentials for an identity token
#[derive(Debug, Deserialize)]
pub struct LoginCommand {
    pub number: i64,
    pub password: String,
}

impl LoginCommand {
    pub fn new(number: i64, password: String) -> Self {
        Self { number, password }
    }
}

/// Result of a successful login
#[derive(Debug, Serialize)]
pub struct LoginResult {
    pub token: String,
    pub number: i64,
}

// =========================================================================
// TransferCommand
// =========================================================================

/// Command to move funds between two accounts
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferCommand {
    /// Account number of the sender
    pub from_account_number: i64,
    /// Account number of the recipient
    pub to_account_number: i64,
    /// Amount in the smallest currency unit (validated by the executor)
    pub amount: i64,
}

impl TransferCommand {
    pub fn new(from_account_number: i64, to_account_number: i64, amount: i64) -> Self {
        Self {
            from_account_number,
            to_account_number,
            amount,
        }
    }
}

/// Result of a successful transfer
#[derive(Debug, Serialize)]
pub struct TransferResult {
    pub message: String,
}
