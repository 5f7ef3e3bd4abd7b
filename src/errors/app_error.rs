use axum::http::StatusCode;
use serde::Serialize;
use std::backtrace::Backtrace;
use std::fmt;

/// Client-facing status tag derived from the HTTP status class:
/// `fail` for 4xx responses, `error` for everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorStatus {
    Fail,
    Error,
}

impl ErrorStatus {
    pub fn for_status_code(code: StatusCode) -> Self {
        if code.is_client_error() {
            Self::Fail
        } else {
            Self::Error
        }
    }
}

impl fmt::Display for ErrorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fail => write!(f, "fail"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Uniform error value consumed by the response renderer.
///
/// `is_operational` separates anticipated, safe-to-expose errors (bad user
/// input, missing records) from unexpected faults whose details must never
/// reach a client outside development.
#[derive(Debug, Clone)]
pub struct AppError {
    pub message: String,
    pub status_code: StatusCode,
    pub is_operational: bool,
    /// Backtrace captured at construction. Only the development renderer
    /// ever writes this into a response body.
    pub stack: String,
}

impl AppError {
    /// Create an operational error with an explicit status code.
    pub fn new(message: impl Into<String>, status_code: StatusCode) -> Self {
        Self {
            message: message.into(),
            status_code,
            is_operational: true,
            stack: Backtrace::force_capture().to_string(),
        }
    }

    /// Wrap an arbitrary fault, applying the 500/`error` defaults.
    ///
    /// Everything that arrives at the error sink without a status of its
    /// own goes through here before any branch runs.
    pub fn from_untyped(err: &dyn fmt::Display) -> Self {
        Self {
            message: err.to_string(),
            status_code: StatusCode::INTERNAL_SERVER_ERROR,
            is_operational: false,
            stack: Backtrace::force_capture().to_string(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(message, StatusCode::NOT_FOUND)
    }

    pub fn status(&self) -> ErrorStatus {
        ErrorStatus::for_status_code(self.status_code)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operational_constructor() {
        let err = AppError::new("No category found with that ID", StatusCode::NOT_FOUND);
        assert_eq!(err.status_code, StatusCode::NOT_FOUND);
        assert!(err.is_operational);
        assert_eq!(err.status(), ErrorStatus::Fail);
    }

    #[test]
    fn test_untyped_defaults_to_500_error() {
        let raw = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        let err = AppError::from_untyped(&raw);
        assert_eq!(err.status_code, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.is_operational);
        assert_eq!(err.status(), ErrorStatus::Error);
        assert_eq!(err.message, "boom");
    }

    #[test]
    fn test_status_derivation() {
        assert_eq!(
            ErrorStatus::for_status_code(StatusCode::BAD_REQUEST),
            ErrorStatus::Fail
        );
        assert_eq!(
            ErrorStatus::for_status_code(StatusCode::NOT_FOUND),
            ErrorStatus::Fail
        );
        assert_eq!(
            ErrorStatus::for_status_code(StatusCode::INTERNAL_SERVER_ERROR),
            ErrorStatus::Error
        );
        assert_eq!(
            ErrorStatus::for_status_code(StatusCode::BAD_GATEWAY),
            ErrorStatus::Error
        );
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&ErrorStatus::Fail).unwrap(),
            "\"fail\""
        );
        assert_eq!(
            serde_json::to_string(&ErrorStatus::Error).unwrap(),
            "\"error\""
        );
    }
}
