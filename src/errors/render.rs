//! Renders an [`AppError`] into the HTTP response, with the detail level
//! gated by the active deployment environment.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use std::sync::OnceLock;
use tracing::error;

use super::app_error::AppError;
use super::ServiceError;
use crate::config::Environment;

static ENVIRONMENT: OnceLock<Environment> = OnceLock::new();

/// Install the deployment environment for the error sink.
///
/// Called once at startup. If never called (unit tests, misassembled
/// binaries), rendering falls back to production behavior.
pub fn install_environment(environment: Environment) {
    let _ = ENVIRONMENT.set(environment);
}

pub fn current_environment() -> Environment {
    ENVIRONMENT.get().copied().unwrap_or(Environment::Production)
}

/// Sole error sink for the request pipeline.
///
/// Exactly one response is produced per invocation; every environment has a
/// branch, since unknown labels were already folded into `Production` when
/// the configuration was parsed.
pub fn global_error_response(err: &ServiceError, environment: Environment) -> Response {
    match environment {
        Environment::Development => render_development(&err.to_app_error()),
        Environment::Test => render_test(&err.to_app_error()),
        Environment::Production => {
            let app = err
                .classified()
                .unwrap_or_else(|| err.to_app_error());
            render_production(&app)
        }
    }
}

/// Full detail: serialized error, message and captured backtrace.
pub fn render_development(err: &AppError) -> Response {
    let body = json!({
        "status": err.status(),
        "error": error_object(err),
        "message": err.message,
        "stack": err.stack,
    });
    (err.status_code, Json(body)).into_response()
}

/// Like development, minus the backtrace.
pub fn render_test(err: &AppError) -> Response {
    let body = json!({
        "status": err.status(),
        "error": error_object(err),
        "message": err.message,
    });
    (err.status_code, Json(body)).into_response()
}

/// Operational errors expose their message; everything else collapses to a
/// generic 500 after the full error is written to the log sink.
pub fn render_production(err: &AppError) -> Response {
    if err.is_operational {
        let body = json!({
            "status": err.status(),
            "message": err.message,
        });
        (err.status_code, Json(body)).into_response()
    } else {
        error!(
            message = %err.message,
            status_code = %err.status_code.as_u16(),
            stack = %err.stack,
            "Unhandled non-operational error"
        );
        let body = json!({
            "status": "error",
            "message": "Something went wrong!",
        });
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

fn error_object(err: &AppError) -> Value {
    json!({
        "message": err.message,
        "statusCode": err.status_code.as_u16(),
        "status": err.status(),
        "isOperational": err.is_operational,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::StoreError;
    use std::collections::BTreeMap;

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn operational_404() -> AppError {
        AppError::not_found("No category found with that ID")
    }

    fn non_operational() -> AppError {
        let raw = std::io::Error::new(std::io::ErrorKind::Other, "db connection lost");
        AppError::from_untyped(&raw)
    }

    #[tokio::test]
    async fn test_development_includes_stack() {
        let response = render_development(&operational_404());
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_json(response).await;
        assert_eq!(body["status"], "fail");
        assert_eq!(body["message"], "No category found with that ID");
        assert!(body["stack"].is_string());
        assert_eq!(body["error"]["isOperational"], true);
        assert_eq!(body["error"]["statusCode"], 404);
    }

    #[tokio::test]
    async fn test_development_renders_non_operational_verbatim() {
        let response = render_development(&non_operational());
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["status"], "error");
        assert_eq!(body["message"], "db connection lost");
        assert!(body["stack"].is_string());
    }

    #[tokio::test]
    async fn test_test_mode_has_no_stack() {
        let response = render_test(&operational_404());
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_json(response).await;
        assert_eq!(body["status"], "fail");
        assert_eq!(body["message"], "No category found with that ID");
        assert!(body.get("stack").is_none());
        assert_eq!(body["error"]["statusCode"], 404);
    }

    #[tokio::test]
    async fn test_production_operational_is_status_and_message_only() {
        let response = render_production(&operational_404());
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_json(response).await;
        assert_eq!(
            body,
            json!({"status": "fail", "message": "No category found with that ID"})
        );
    }

    #[tokio::test]
    async fn test_production_non_operational_is_generic_500() {
        let mut err = non_operational();
        // Even a non-500 code on a non-operational error must not leak.
        err.status_code = StatusCode::BAD_GATEWAY;

        let response = render_production(&err);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(
            body,
            json!({"status": "error", "message": "Something went wrong!"})
        );
    }

    #[tokio::test]
    async fn test_global_sink_classifies_in_production() {
        let err = ServiceError::from(StoreError::Cast {
            path: "id".to_string(),
            value: "xyz".to_string(),
        });

        let response = global_error_response(&err, Environment::Production);
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(
            body,
            json!({"status": "fail", "message": "Invalid id: xyz."})
        );
    }

    #[tokio::test]
    async fn test_global_sink_classifies_duplicate_key() {
        let err = ServiceError::from(StoreError::DuplicateKey {
            errmsg: r#"E11000 duplicate key error index: categories_name_key dup key: { name: "Books" }"#
                .to_string(),
        });

        let response = global_error_response(&err, Environment::Production);
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["status"], "fail");
        assert!(body["message"].as_str().unwrap().contains("\"Books\""));
    }

    #[tokio::test]
    async fn test_global_sink_classifies_validation() {
        let mut errors = BTreeMap::new();
        errors.insert("name".to_string(), "name is required".to_string());
        errors.insert("slug".to_string(), "slug is required".to_string());
        let err = ServiceError::from(StoreError::Validation { errors });

        let response = global_error_response(&err, Environment::Production);
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(
            body["message"],
            "Invalid input data. name is required. slug is required"
        );
    }

    #[tokio::test]
    async fn test_global_sink_unrecognized_store_error_stays_generic() {
        let err = ServiceError::from(StoreError::Database {
            message: "connection reset by peer".to_string(),
        });

        let response = global_error_response(&err, Environment::Production);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(
            body,
            json!({"status": "error", "message": "Something went wrong!"})
        );
    }

    #[tokio::test]
    async fn test_global_sink_skips_classification_outside_production() {
        // In development the raw store error renders with the 500/error
        // defaults and a stack, with no classification step.
        let err = ServiceError::from(StoreError::Cast {
            path: "id".to_string(),
            value: "xyz".to_string(),
        });

        let response = global_error_response(&err, Environment::Development);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["status"], "error");
        assert!(body["stack"].is_string());
    }

    #[tokio::test]
    async fn test_global_sink_test_mode_never_has_stack() {
        let err = ServiceError::from(StoreError::Database {
            message: "boom".to_string(),
        });

        let response = global_error_response(&err, Environment::Test);
        let body = body_json(response).await;
        assert!(body.get("stack").is_none());
    }

    #[test]
    fn test_current_environment_defaults_to_production() {
        // The cell is process-wide; this test relies on nothing having
        // installed a different environment in the unit-test binary.
        assert_eq!(current_environment(), Environment::Production);
    }
}
