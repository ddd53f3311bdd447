//! Account model
//!
//! The ledger's identity record plus the draft used to open a new account.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{DateTime, Utc};
use rand::rngs::OsRng;
use rand::Rng;
use serde::Serialize;

use super::DomainError;

/// Account numbers are drawn from `[1, MAX_ACCOUNT_NUMBER)`
pub const MAX_ACCOUNT_NUMBER: i64 = 1_000_000;

/// A stored ledger account.
///
/// `encrypted_password` never leaves the server: it is skipped on serialization.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub number: i64,
    #[serde(skip_serializing)]
    pub encrypted_password: String,
    /// Balance in the smallest currency unit
    pub balance: i64,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Check a plaintext password against the stored argon2 hash
    pub fn valid_password(&self, password: &str) -> bool {
        let Ok(parsed_hash) = PasswordHash::new(&self.encrypted_password) else {
            return false;
        };

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }
}

/// An account that has not been stored yet
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub first_name: String,
    pub last_name: String,
    pub number: i64,
    pub encrypted_password: String,
    pub balance: i64,
    pub created_at: DateTime<Utc>,
}

impl NewAccount {
    /// Build a new account with a random number, zero balance and a hashed password
    pub fn new(first_name: &str, last_name: &str, password: &str) -> Result<Self, DomainError> {
        Ok(Self {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            number: random_account_number(),
            encrypted_password: hash_password(password)?,
            balance: 0,
            created_at: Utc::now(),
        })
    }

    pub fn with_number(mut self, number: i64) -> Self {
        self.number = number;
        self
    }

    pub fn with_opening_balance(mut self, balance: i64) -> Self {
        self.balance = balance;
        self
    }

    /// Draw a fresh account number (used when the previous one collided)
    pub fn renumber(&mut self) {
        self.number = random_account_number();
    }

    /// Attach the storage-assigned id
    pub fn into_account(self, id: i64) -> Account {
        Account {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            number: self.number,
            encrypted_password: self.encrypted_password,
            balance: self.balance,
            created_at: self.created_at,
        }
    }
}

fn random_account_number() -> i64 {
    rand::thread_rng().gen_range(1..MAX_ACCOUNT_NUMBER)
}

/// Hash a password using Argon2id
fn hash_password(password: &str) -> Result<String, DomainError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| DomainError::InvalidPassword(e.to_string()))
}
