//! Translates data-layer errors into sanitized client-facing errors.
//!
//! Each classifier is pure: it reads the store error and builds a fresh
//! operational [`AppError`] with a 400 status. Unrecognized store faults
//! return `None` and fall back to the generic non-operational path.

use axum::http::StatusCode;
use std::collections::BTreeMap;

use super::app_error::AppError;
use crate::db::StoreError;

/// Placeholder used when the duplicate-key diagnostic carries no quoted
/// value to extract.
const UNKNOWN_VALUE: &str = "unknown";

/// Malformed identifier / type coercion failure.
pub fn cast_error(path: &str, value: &str) -> AppError {
    let message = format!("Invalid {path}: {value}.");
    AppError::new(message, StatusCode::BAD_REQUEST)
}

/// Uniqueness-constraint violation.
///
/// The driver diagnostic encloses the offending value in quotation marks
/// (for example `dup key: { name: "Books" }`). If the diagnostic carries no
/// quoted substring the message falls back to a placeholder instead of
/// failing the extraction.
pub fn duplicate_fields_error(errmsg: &str) -> AppError {
    let value = first_quoted(errmsg).unwrap_or(UNKNOWN_VALUE);
    let message = format!("Duplicate field value: {value}. Please use another value!");
    AppError::new(message, StatusCode::BAD_REQUEST)
}

/// Aggregated field-validation failures keyed by field name.
pub fn validation_error(errors: &BTreeMap<String, String>) -> AppError {
    let joined = errors.values().cloned().collect::<Vec<_>>().join(". ");
    let message = format!("Invalid input data. {joined}");
    AppError::new(message, StatusCode::BAD_REQUEST)
}

/// Map a recognized store error to its operational client error.
///
/// Returns `None` for unrecognized faults so the caller can render the
/// original error through the operational/non-operational branch instead.
pub fn classify_store_error(err: &StoreError) -> Option<AppError> {
    match err {
        StoreError::Cast { path, value } => Some(cast_error(path, value)),
        StoreError::DuplicateKey { errmsg } => Some(duplicate_fields_error(errmsg)),
        StoreError::Validation { errors } => Some(validation_error(errors)),
        StoreError::Database { .. } => None,
    }
}

/// Find the first quoted substring (single or double quotes, matching pair)
/// in the diagnostic text, quotes included.
fn first_quoted(text: &str) -> Option<&str> {
    let (start, quote) = text.char_indices().find(|&(_, c)| c == '"' || c == '\'')?;
    let rest = &text[start + 1..];
    let len = rest.find(quote)?;
    Some(&text[start..start + len + 2])
}
