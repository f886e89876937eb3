//! HTTP route handlers, one module per resource.

pub mod customers;
pub mod health;
pub mod inventory;
pub mod metrics;
pub mod orders;
pub mod policies;
pub mod returns;
pub mod shipments;
pub mod tickets;

use std::str::FromStr;

use crate::error::ApiError;

/// Parses a path or body identifier, naming the field on failure.
pub(crate) fn parse_id<T: FromStr>(raw: &str, field: &str) -> Result<T, ApiError> {
    raw.trim()
        .parse()
        .map_err(|_| ApiError::bad_request(format!("Invalid {field}: {raw}")))
}

/// Returns the trimmed value, or `None` when absent or blank.
pub(crate) fn required(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
