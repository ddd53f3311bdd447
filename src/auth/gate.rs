//! Authorization gate
//!
//! Guards routes that read or move an account's funds. A request passes only
//! when its identity token is valid and bound to the account number the
//! request targets. The target is decoded from the request exactly once and
//! handed to the route through [`Authorized`].

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::HeaderMap;

use crate::api::extract::{parse_id, ApiJson};
use crate::api::AppState;
use crate::error::AppError;
use crate::handlers::TransferCommand;
use crate::store::{LedgerError, LedgerStore};

use super::token::{Claims, TokenValidator};

/// Header carrying the identity token
pub const TOKEN_HEADER: &str = "x-jwt-token";

/// How a protected request names the account it acts on
#[async_trait]
pub trait OwnershipRule: Sized + Send + Sync {
    /// Decode the protected target from the request
    async fn decode(req: Request, state: &AppState) -> Result<Self, AppError>;

    /// The account number the caller's token must be bound to
    async fn expected_account(&self, store: &dyn LedgerStore) -> Result<i64, LedgerError>;
}

/// Read-by-id target: the `{id}` path segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountIdTarget(pub i64);

#[async_trait]
impl OwnershipRule for AccountIdTarget {
    async fn decode(req: Request, state: &AppState) -> Result<Self, AppError> {
        let (mut parts, _body) = req.into_parts();
        let Path(raw) = Path::<String>::from_request_parts(&mut parts, state)
            .await
            .map_err(|e| AppError::InvalidRequest(e.body_text()))?;

        parse_id(&raw).map(Self)
    }

    async fn expected_account(&self, store: &dyn LedgerStore) -> Result<i64, LedgerError> {
        store.get_account_by_id(self.0).await.map(|acc| acc.number)
    }
}

/// Transfer target: the body's `fromAccountNumber`
#[async_trait]
impl OwnershipRule for TransferCommand {
    async fn decode(req: Request, state: &AppState) -> Result<Self, AppError> {
        let ApiJson(body) = ApiJson::<TransferCommand>::from_request(req, state).await?;
        Ok(body)
    }

    async fn expected_account(&self, _store: &dyn LedgerStore) -> Result<i64, LedgerError> {
        Ok(self.from_account_number)
    }
}

/// Token validation plus ownership cross-check
#[derive(Clone)]
pub struct AuthorizationGate {
    validator: TokenValidator,
    store: Arc<dyn LedgerStore>,
}

impl AuthorizationGate {
    pub fn new(validator: TokenValidator, store: Arc<dyn LedgerStore>) -> Self {
        Self { validator, store }
    }

    /// Validate the bearer token in `headers`
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<Claims, AppError> {
        let token = headers
            .get(TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                tracing::debug!("Rejected: missing {} header", TOKEN_HEADER);
                AppError::PermissionDenied
            })?;

        self.validator.validate(token).map_err(|e| {
            tracing::warn!(error = %e, "Rejected: token validation failed");
            AppError::PermissionDenied
        })
    }

    /// Allow only if `claims` are bound to the account `target` resolves to
    pub async fn authorize<R: OwnershipRule>(
        &self,
        claims: &Claims,
        target: &R,
    ) -> Result<(), AppError> {
        let expected = match target.expected_account(self.store.as_ref()).await {
            Ok(number) => number,
            Err(e) if e.is_not_found() => {
                tracing::warn!(
                    account_number = claims.account_number,
                    "Rejected: protected account does not exist"
                );
                return Err(AppError::PermissionDenied);
            }
            Err(e) => return Err(AppError::Storage(e)),
        };

        if claims.account_number != expected {
            tracing::warn!(
                account_number = claims.account_number,
                expected,
                "Rejected: account number mismatch"
            );
            return Err(AppError::PermissionDenied);
        }

        Ok(())
    }
}

/// Extractor for gated routes: the verified claims plus the decoded target.
///
/// A missing or bad token is always 403; once the token is valid, a malformed
/// path id or body is rejected as 400 `invalid_request`.
#[derive(Debug)]
pub struct Authorized<T> {
    pub claims: Claims,
    pub target: T,
}

#[async_trait]
impl<T: OwnershipRule> FromRequest<AppState> for Authorized<T> {
    type Rejection = AppError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        // Token first, so unauthenticated callers never learn anything about the target
        let claims = state.gate.authenticate(req.headers())?;
        let target = T::decode(req, state).await?;
        state.gate.authorize(&claims, &target).await?;

        Ok(Self { claims, target })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use crate::auth::TokenIssuer;
    use crate::domain::NewAccount;
    use crate::store::MemoryLedgerStore;

    const SECRET: &str = "gate-test-secret";

    async fn gate_with_accounts() -> (AuthorizationGate, TokenIssuer, Arc<dyn LedgerStore>) {
        let store: Arc<dyn LedgerStore> = Arc::new(MemoryLedgerStore::new());
        for number in [101, 202] {
            let draft = NewAccount {
                first_name: "Test".to_string(),
                last_name: "Owner".to_string(),
                number,
                encrypted_password: String::new(),
                balance: 0,
                created_at: Utc::now(),
            };
            store.create_account(draft).await.unwrap();
        }

        let gate = AuthorizationGate::new(TokenValidator::new(SECRET).unwrap(), store.clone());
        (gate, TokenIssuer::new(SECRET, 900).unwrap(), store)
    }

    fn headers_with(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(TOKEN_HEADER, token.parse().unwrap());
        headers
    }

    #[tokio::test]
    async fn test_missing_token_denied() {
        let (gate, _, _) = gate_with_accounts().await;
        assert!(matches!(
            gate.authenticate(&HeaderMap::new()),
            Err(AppError::PermissionDenied)
        ));
        assert!(matches!(
            gate.authenticate(&headers_with("garbage")),
            Err(AppError::PermissionDenied)
        ));
    }

    #[tokio::test]
    async fn test_owner_reads_own_account() {
        let (gate, issuer, _) = gate_with_accounts().await;
        let token = issuer.issue_at(101, Utc::now()).unwrap();

        let claims = gate.authenticate(&headers_with(&token)).unwrap();
        assert!(gate.authorize(&claims, &AccountIdTarget(1)).await.is_ok());
    }

    #[tokio::test]
    async fn test_other_account_denied() {
        let (gate, issuer, _) = gate_with_accounts().await;
        let token = issuer.issue_at(101, Utc::now()).unwrap();
        let claims = gate.authenticate(&headers_with(&token)).unwrap();

        assert!(matches!(
            gate.authorize(&claims, &AccountIdTarget(2)).await,
            Err(AppError::PermissionDenied)
        ));
    }

    #[tokio::test]
    async fn test_unknown_account_denied() {
        let (gate, issuer, _) = gate_with_accounts().await;
        let token = issuer.issue_at(101, Utc::now()).unwrap();
        let claims = gate.authenticate(&headers_with(&token)).unwrap();

        assert!(matches!(
            gate.authorize(&claims, &AccountIdTarget(99)).await,
            Err(AppError::PermissionDenied)
        ));
    }

    #[tokio::test]
    async fn test_transfer_source_must_match() {
        let (gate, issuer, _) = gate_with_accounts().await;
        let token = issuer.issue_at(101, Utc::now()).unwrap();
        let claims = gate.authenticate(&headers_with(&token)).unwrap();

        let own = TransferCommand::new(101, 202, 10);
        assert!(gate.authorize(&claims, &own).await.is_ok());

        // Paying into your own account from someone else's is still denied
        let foreign = TransferCommand::new(202, 101, 10);
        assert!(matches!(
            gate.authorize(&claims, &foreign).await,
            Err(AppError::PermissionDenied)
        ));
    }
}
