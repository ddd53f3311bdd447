//! API module
//!
//! HTTP API endpoints, extractors and middleware.

use std::sync::Arc;

use crate::auth::{AuthorizationGate, TokenIssuer, TokenValidator};
use crate::store::LedgerStore;

pub mod extract;
pub mod middleware;
pub mod routes;

pub use routes::create_router;

/// Shared state handed to every route
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn LedgerStore>,
    pub issuer: TokenIssuer,
    pub gate: AuthorizationGate,
}

impl AppState {
    pub fn new(store: Arc<dyn LedgerStore>, issuer: TokenIssuer, validator: TokenValidator) -> Self {
        Self {
            gate: AuthorizationGate::new(validator, store.clone()),
            store,
            issuer,
        }
    }
}
