//! Authentication module
//!
//! Identity tokens and the authorization gate for protected routes.

pub mod gate;
pub mod token;

pub use gate::{AccountIdTarget, AuthorizationGate, Authorized, OwnershipRule, TOKEN_HEADER};
pub use token::{Claims, TokenError, TokenIssuer, TokenValidator};
