//! API Routes
//!
//! HTTP endpoint definitions.

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use crate::auth::{AccountIdTarget, Authorized};
use crate::domain::Account;
use crate::error::AppError;
use crate::handlers::{
    CreateAccountCommand, CreateAccountHandler, LoginCommand, LoginHandler, LoginResult,
    TransferCommand, TransferExecutor, TransferResult,
};

use super::extract::{parse_id, ApiJson};
use super::AppState;

// =========================================================================
// Response types
// =========================================================================

#[derive(Debug, Serialize)]
pub struct DeleteAccountResponse {
    pub deleted: i64,
}

// =========================================================================
// API Router
// =========================================================================

/// Create the API router
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/account", get(list_accounts).post(create_account))
        // Gated: token must belong to the account with this id
        .route("/account/:id", get(get_account_by_id).delete(delete_account))
        // Gated: token must belong to fromAccountNumber
        .route("/transfer", post(transfer))
}

// =========================================================================
// POST /login
// =========================================================================

/// Exchange account number and password for an identity token
async fn login(
    State(state): State<AppState>,
    ApiJson(command): ApiJson<LoginCommand>,
) -> Result<Json<LoginResult>, AppError> {
    let handler = LoginHandler::new(state.store.clone(), state.issuer.clone());

    Ok(Json(handler.execute(command).await?))
}

// =========================================================================
// GET /account
// =========================================================================

async fn list_accounts(State(state): State<AppState>) -> Result<Json<Vec<Account>>, AppError> {
    Ok(Json(state.store.get_accounts().await?))
}

// =========================================================================
// POST /account
// =========================================================================

/// Open a new account
async fn create_account(
    State(state): State<AppState>,
    ApiJson(command): ApiJson<CreateAccountCommand>,
) -> Result<Json<Account>, AppError> {
    let handler = CreateAccountHandler::new(state.store.clone());

    let account = handler.execute(command).await?;

    Ok(Json(account))
}

// =========================================================================
// GET /account/:id
// =========================================================================

/// Read one account (owner only)
async fn get_account_by_id(
    State(state): State<AppState>,
    Authorized {
        target: AccountIdTarget(id),
        ..
    }: Authorized<AccountIdTarget>,
) -> Result<Json<Account>, AppError> {
    Ok(Json(state.store.get_account_by_id(id).await?))
}

// =========================================================================
// DELETE /account/:id
// =========================================================================

async fn delete_account(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<DeleteAccountResponse>, AppError> {
    let id = parse_id(&raw_id)?;
    state.store.delete_account(id).await?;

    tracing::info!(id, "Account deleted");

    Ok(Json(DeleteAccountResponse { deleted: id }))
}

// =========================================================================
// POST /transfer
// =========================================================================

/// Move funds out of the caller's own account
async fn transfer(
    State(state): State<AppState>,
    Authorized { claims, target }: Authorized<TransferCommand>,
) -> Result<Json<TransferResult>, AppError> {
    tracing::debug!(caller = claims.account_number, "Transfer authorized");

    let executor = TransferExecutor::new(state.store.clone());

    Ok(Json(executor.execute(target).await?))
}
