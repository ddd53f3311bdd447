//! Identity tokens
//!
//! HS256-signed JWTs binding a caller to one account number until `expiresAt`.
//! Tokens are stateless: nothing is tracked server-side.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::domain::Account;

/// The only accepted signing scheme
pub const TOKEN_ALGORITHM: Algorithm = Algorithm::HS256;

/// Payload carried inside an identity token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub account_number: i64,
    /// Unix timestamp (seconds)
    pub expires_at: i64,
}

/// Token errors. Callers only ever see "permission denied".
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("Signing secret is empty")]
    EmptySecret,

    #[error("Token lifetime must be positive")]
    InvalidLifetime,

    #[error("Token encoding failed: {0}")]
    Encoding(jsonwebtoken::errors::Error),

    #[error("Token is invalid: {0}")]
    Invalid(jsonwebtoken::errors::Error),

    #[error("Token expired at {0}")]
    Expired(i64),
}

/// Creates identity tokens at login
#[derive(Clone)]
pub struct TokenIssuer {
    key: EncodingKey,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str, ttl_seconds: i64) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::EmptySecret);
        }
        if ttl_seconds <= 0 {
            return Err(TokenError::InvalidLifetime);
        }

        Ok(Self {
            key: EncodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::seconds(ttl_seconds),
        })
    }

    /// Issue a token for `account`, expiring one lifetime from now
    pub fn issue(&self, account: &Account) -> Result<String, TokenError> {
        self.issue_at(account.number, Utc::now())
    }

    pub fn issue_at(&self, account_number: i64, now: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = Claims {
            account_number,
            expires_at: (now + self.ttl).timestamp(),
        };

        encode(&Header::new(TOKEN_ALGORITHM), &claims, &self.key).map_err(TokenError::Encoding)
    }
}

/// Verifies identity tokens on gated routes
#[derive(Clone)]
pub struct TokenValidator {
    key: DecodingKey,
    validation: Validation,
}

impl TokenValidator {
    pub fn new(secret: &str) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::EmptySecret);
        }

        // Restricting to one algorithm rejects alg-confusion and "none" tokens.
        // Expiry lives in `expiresAt`, not the registered `exp`, so it is checked below.
        let mut validation = Validation::new(TOKEN_ALGORITHM);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        Ok(Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        })
    }

    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        self.validate_at(token, Utc::now())
    }

    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let claims = decode::<Claims>(token, &self.key, &self.validation)
            .map_err(TokenError::Invalid)?
            .claims;

        if claims.expires_at <= now.timestamp() {
            return Err(TokenError::Expired(claims.expires_at));
        }

        Ok(claims)
    }
}

/// Build the issuer/validator pair from the process configuration
pub fn from_config(config: &Config) -> Result<(TokenIssuer, TokenValidator), TokenError> {
    Ok((
        TokenIssuer::new(&config.jwt_secret, config.token_ttl_seconds)?,
        TokenValidator::new(&config.jwt_secret)?,
    ))
}
