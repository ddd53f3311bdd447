//! Request extractors

use axum::extract::FromRequest;

use crate::error::AppError;

/// `Json` whose rejection is rendered through [`AppError`], so malformed
/// bodies get the same error envelope as every other failure.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Parse an `{id}` path segment
pub fn parse_id(raw: &str) -> Result<i64, AppError> {
    raw.parse()
        .map_err(|_| AppError::InvalidRequest(format!("invalid id given {}", raw)))
}
