//! Common test utilities

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use bank_ledger::api::{self, AppState};
use bank_ledger::auth::{TokenIssuer, TokenValidator, TOKEN_HEADER};
use bank_ledger::store::{LedgerStore, MemoryLedgerStore};
use bank_ledger::{Account, NewAccount};
use serde_json::Value;
use tower::util::ServiceExt;

pub const TEST_SECRET: &str = "integration-test-secret";

/// Router plus direct handles on its store and token issuer
pub struct TestApp {
    pub router: Router,
    pub store: Arc<dyn LedgerStore>,
    pub issuer: TokenIssuer,
}

impl TestApp {
    pub fn new() -> Self {
        let store: Arc<dyn LedgerStore> = Arc::new(MemoryLedgerStore::new());
        let issuer = TokenIssuer::new(TEST_SECRET, 900).expect("issuer");
        let validator = TokenValidator::new(TEST_SECRET).expect("validator");

        let router = api::create_router()
            .with_state(AppState::new(store.clone(), issuer.clone(), validator));

        Self {
            router,
            store,
            issuer,
        }
    }

    /// Seed an account with a fixed number and balance (no usable password)
    pub async fn account(&self, number: i64, balance: i64) -> Account {
        let draft = NewAccount {
            first_name: "Test".to_string(),
            last_name: format!("Owner{}", number),
            number,
            encrypted_password: String::new(),
            balance,
            created_at: chrono::Utc::now(),
        };
        self.store.create_account(draft).await.expect("seed account")
    }

    /// Seed an account that can log in with `password`
    pub async fn account_with_password(&self, number: i64, balance: i64, password: &str) -> Account {
        let draft = NewAccount::new("Test", "Owner", password)
            .expect("hash password")
            .with_number(number)
            .with_opening_balance(balance);
        self.store.create_account(draft).await.expect("seed account")
    }

    pub fn token_for(&self, number: i64) -> String {
        self.issuer
            .issue_at(number, chrono::Utc::now())
            .expect("issue token")
    }

    pub async fn balance(&self, number: i64) -> i64 {
        self.store
            .get_account_by_number(number)
            .await
            .expect("account exists")
            .balance
    }

    /// Send a request and decode the JSON body (Null when empty or not JSON)
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, json)
    }
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(TOKEN_HEADER, token);
    }
    builder.body(Body::empty()).expect("request")
}

pub fn post_json(uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    post_raw(uri, token, body.to_string())
}

pub fn post_raw(uri: &str, token: Option<&str>, body: String) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header(TOKEN_HEADER, token);
    }
    builder.body(Body::from(body)).expect("request")
}
