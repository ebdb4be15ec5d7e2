//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes, and the ownership guard
//! every document-scoped handler goes through.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use study_assistant_core::{domain::Document, ports::PortError};
use uuid::Uuid;

use crate::error::ApiError;
use crate::web::state::AppState;

/// The identity resolved from a bearer credential.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
    pub name: String,
    /// The credential itself, kept so logout can revoke it.
    pub token: String,
}

/// Extracts the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Middleware that validates the bearer token and resolves the user.
///
/// If valid, inserts an `AuthUser` into request extensions for handlers to use.
/// If invalid, expired or missing, returns 401 Unauthorized.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    // 1. Extract the bearer token
    let token = bearer_token(req.headers())
        .ok_or_else(|| ApiError::Unauthorized("No token provided".to_string()))?
        .to_string();

    // 2. Resolve it to a user, rejecting unknown and expired sessions
    let user = state
        .db
        .validate_auth_session(&token)
        .await
        .map_err(|e| match e {
            PortError::Unauthorized | PortError::NotFound(_) => {
                ApiError::Unauthorized("Invalid or expired token".to_string())
            }
            other => other.into(),
        })?;

    // 3. Insert the identity into request extensions
    req.extensions_mut().insert(AuthUser {
        user_id: user.id,
        email: user.email,
        name: user.name,
        token,
    });

    // 4. Continue to the handler
    Ok(next.run(req).await)
}

/// Loads a document by its path id and enforces that `user` owns it.
///
/// An unparsable id or a missing document is a 404; a document owned by
/// someone else is a 401.
pub async fn load_owned_document(
    state: &AppState,
    user: &AuthUser,
    raw_id: &str,
) -> Result<Document, ApiError> {
    let document_id =
        Uuid::parse_str(raw_id).map_err(|_| ApiError::NotFound("Invalid file ID".to_string()))?;

    let document = state
        .db
        .get_document_by_id(document_id)
        .await
        .map_err(|e| match e {
            PortError::NotFound(_) => ApiError::NotFound("File not found".to_string()),
            other => other.into(),
        })?;

    if !document.is_owned_by(user.user_id) {
        return Err(ApiError::Unauthorized(
            "You do not have access to this file".to_string(),
        ));
    }
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_token_requires_the_scheme_and_a_value() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc123"));
        assert_eq!(bearer_token(&headers), Some("abc123"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc123"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer   "));
        assert_eq!(bearer_token(&headers), None);
    }
}
