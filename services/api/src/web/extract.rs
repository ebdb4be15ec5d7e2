//! services/api/src/web/extract.rs
//!
//! A JSON body extractor that runs request validation before the handler.

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;
use serde_json::error::Category;

use crate::error::{ApiError, ValidationIssue};

/// Request bodies that can check their own field constraints.
pub trait Validate {
    /// Every violated constraint; empty when the value is acceptable.
    fn validate(&self) -> Vec<ValidationIssue>;
}

/// Deserializes the body as JSON and validates it.
///
/// An empty body is read as `{}`, so endpoints whose parameters are all
/// optional can be called without one.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;

        let body: &[u8] = if bytes.iter().all(u8::is_ascii_whitespace) {
            b"{}"
        } else {
            &bytes
        };

        let value: T = serde_json::from_slice(body).map_err(|e| match e.classify() {
            Category::Data => ApiError::Validation(vec![ValidationIssue::new("body", e.to_string())]),
            _ => ApiError::BadRequest(format!("Invalid JSON body: {}", e)),
        })?;

        let issues = value.validate();
        if !issues.is_empty() {
            return Err(ApiError::Validation(issues));
        }
        Ok(Self(value))
    }
}

/// Checks an optional count parameter against `1..=max`.
pub fn check_count(
    issues: &mut Vec<ValidationIssue>,
    field: &str,
    value: Option<i64>,
    max: usize,
) {
    if let Some(value) = value {
        if value < 1 || value > max as i64 {
            issues.push(ValidationIssue::new(
                field,
                format!("must be between 1 and {}", max),
            ));
        }
    }
}
