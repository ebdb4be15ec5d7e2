//! services/api/src/error.rs
//!
//! Defines the primary error type for the entire API service, and the single
//! place where errors are logged and turned into HTTP responses.

use crate::config::ConfigError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use study_assistant_core::{normalize::NormalizeError, ports::PortError};
use tracing::{error, warn};
use utoipa::ToSchema;

/// One failed check from request validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    BadRequest(String),

    /// The request body failed schema validation.
    #[error("Validation error")]
    Validation(Vec<ValidationIssue>),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    /// The model replied, but nothing schema-valid could be recovered from it.
    #[error("Failed to normalize the AI response: {0}")]
    Normalization(#[from] NormalizeError),

    /// The completion provider call itself failed.
    #[error("AI provider error: {0}")]
    Provider(String),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

impl From<PortError> for ApiError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::NotFound(msg) => ApiError::NotFound(msg),
            PortError::Conflict(msg) => ApiError::Conflict(msg),
            PortError::Unauthorized => ApiError::Unauthorized("Unauthorized".to_string()),
            PortError::Provider(msg) => ApiError::Provider(msg),
            PortError::Unexpected(msg) => ApiError::Internal(msg),
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Normalization(_)
            | ApiError::Provider(_)
            | ApiError::Config(_)
            | ApiError::Database(_)
            | ApiError::Io(_)
            | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::Normalization(_) => "NORMALIZATION_ERROR",
            ApiError::Provider(_) => "PROVIDER_ERROR",
            ApiError::Config(_)
            | ApiError::Database(_)
            | ApiError::Io(_)
            | ApiError::Internal(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    /// The message shown to the client. Infrastructure details stay in the logs.
    fn public_message(&self) -> String {
        match self {
            ApiError::Normalization(err) => {
                format!("Failed to process the AI response for {}", err.feature())
            }
            ApiError::Provider(_) => "The AI provider request failed".to_string(),
            ApiError::Config(_) | ApiError::Database(_) | ApiError::Io(_) | ApiError::Internal(_) => {
                "Internal server error".to_string()
            }
            other => other.to_string(),
        }
    }
}

/// The JSON body of every error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationIssue>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        if status.is_server_error() {
            error!(code, status = status.as_u16(), error = %self, "Request failed");
        } else {
            warn!(code, status = status.as_u16(), error = %self, "Request rejected");
        }

        let error = self.public_message();
        let details = match self {
            ApiError::Validation(issues) => Some(issues),
            _ => None,
        };

        let body = ErrorBody {
            success: false,
            error,
            code: Some(code.to_string()),
            details,
        };
        (status, Json(body)).into_response()
    }
}
