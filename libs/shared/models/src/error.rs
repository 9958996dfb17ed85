use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Validation error on {field}: {message}")]
    ValidationError { field: String, message: String },

    #[error("Policy violation: {message}")]
    PolicyViolation { message: String, details: Value },

    #[error("Conflict: {message}")]
    Conflict { message: String, details: Value },

    #[error("Database error: {0}")]
    Database(String),
}

impl AppError {
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "not_found",
            AppError::ValidationError { .. } => "validation",
            AppError::PolicyViolation { .. } => "policy_violation",
            AppError::Conflict { .. } => "conflict",
            AppError::Database(_) => "internal",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ValidationError { .. } => StatusCode::BAD_REQUEST,
            AppError::PolicyViolation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let kind = self.kind();

        let body = match &self {
            AppError::ValidationError { field, message } => json!({
                "error": message,
                "kind": kind,
                "field": field,
            }),
            AppError::PolicyViolation { message, details }
            | AppError::Conflict { message, details } => {
                let mut body = json!({
                    "error": message,
                    "kind": kind,
                });
                if let (Some(target), Some(extra)) = (body.as_object_mut(), details.as_object()) {
                    for (key, value) in extra {
                        target.insert(key.clone(), value.clone());
                    }
                }
                body
            }
            AppError::NotFound(msg) => json!({
                "error": msg,
                "kind": kind,
            }),
            // Store details stay in the logs.
            AppError::Database(_) => json!({
                "error": "Internal server error",
                "kind": kind,
            }),
        };

        if status.is_server_error() {
            tracing::error!("Error: {}: {}", status, self);
        } else {
            tracing::warn!("Request rejected: {}: {}", status, self);
        }

        (status, Json(body)).into_response()
    }
}
