//! services/api/src/web/auth.rs
//!
//! Authentication endpoints for registration, login, profile and logout.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{extract::State, http::StatusCode, response::IntoResponse, Extension, Json};
use chrono::{DateTime, Duration, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, LazyLock};
use study_assistant_core::{
    domain::{AuthSession, NewUser, User},
    ports::PortError,
};
use tracing::{error, info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{ApiError, ErrorBody, ValidationIssue};
use crate::web::extract::{Validate, ValidatedJson};
use crate::web::middleware::AuthUser;
use crate::web::rest::ApiResponse;
use crate::web::state::AppState;

const MIN_PASSWORD_CHARS: usize = 6;
const MIN_NAME_CHARS: usize = 2;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

impl Validate for RegisterRequest {
    fn validate(&self) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        if !EMAIL_RE.is_match(self.email.trim()) {
            issues.push(ValidationIssue::new("email", "Invalid email format"));
        }
        if self.password.chars().count() < MIN_PASSWORD_CHARS {
            issues.push(ValidationIssue::new(
                "password",
                format!("Password must be at least {} characters", MIN_PASSWORD_CHARS),
            ));
        }
        if self.name.trim().chars().count() < MIN_NAME_CHARS {
            issues.push(ValidationIssue::new(
                "name",
                format!("Name must be at least {} characters", MIN_NAME_CHARS),
            ));
        }
        issues
    }
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl Validate for LoginRequest {
    fn validate(&self) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        if !EMAIL_RE.is_match(self.email.trim()) {
            issues.push(ValidationIssue::new("email", "Invalid email format"));
        }
        if self.password.is_empty() {
            issues.push(ValidationIssue::new("password", "Password is required"));
        }
        issues
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            created_at: None,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct AuthPayload {
    pub user: UserView,
    pub token: String,
}

#[derive(Serialize, ToSchema)]
pub struct ProfilePayload {
    pub user: UserView,
}

//=========================================================================================
// Helpers
//=========================================================================================

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Internal(format!("Failed to hash password: {}", e)))
}

fn verify_password(password: &str, password_hash: &str) -> Result<bool, ApiError> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|e| ApiError::Internal(format!("Failed to parse password hash: {}", e)))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Mints and persists a bearer token for `user_id`.
async fn issue_token(state: &AppState, user_id: Uuid) -> Result<String, ApiError> {
    let session = AuthSession {
        token: Uuid::new_v4().to_string(),
        user_id,
        expires_at: Utc::now() + Duration::days(state.config.session_ttl_days),
    };
    state.db.create_auth_session(&session).await.map_err(|e| {
        error!("Failed to create auth session: {:?}", e);
        ApiError::from(e)
    })?;
    Ok(session.token)
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /api/auth/register - Create a new user account
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created, wrapped in the success envelope", body = AuthPayload),
        (status = 400, description = "Validation failed", body = ErrorBody),
        (status = 409, description = "Email already registered", body = ErrorBody)
    )
)]
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = normalize_email(&req.email);

    // 1. Reject duplicates before doing the hashing work
    match state.db.get_user_credentials_by_email(&email).await {
        Ok(_) => {
            warn!(email = %email, "Registration for an existing email");
            return Err(ApiError::Conflict(
                "User with this email already exists".to_string(),
            ));
        }
        Err(PortError::NotFound(_)) => {}
        Err(e) => return Err(e.into()),
    }

    // 2. Hash the password and create the user
    let password_hash = hash_password(&req.password)?;
    let user = state
        .db
        .create_user(NewUser {
            email,
            name: req.name.trim().to_string(),
            password_hash,
        })
        .await?;

    // 3. Issue a bearer token
    let token = issue_token(&state, user.id).await?;
    info!(user_id = %user.id, "User registered");

    let payload = AuthPayload {
        user: UserView::from(&user),
        token,
    };
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(payload).with_message("User registered successfully")),
    ))
}

/// POST /api/auth/login - Login with an existing account
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful, wrapped in the success envelope", body = AuthPayload),
        (status = 401, description = "Invalid credentials", body = ErrorBody)
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let invalid = || ApiError::Unauthorized("Invalid email or password".to_string());

    // 1. Look up the credentials
    let credentials = state
        .db
        .get_user_credentials_by_email(&normalize_email(&req.email))
        .await
        .map_err(|e| match e {
            PortError::NotFound(_) => invalid(),
            other => other.into(),
        })?;

    // 2. Verify the password
    if !verify_password(&req.password, &credentials.password_hash)? {
        warn!(user_id = %credentials.user.id, "Login with a wrong password");
        return Err(invalid());
    }

    // 3. Issue a bearer token
    let token = issue_token(&state, credentials.user.id).await?;
    info!(user_id = %credentials.user.id, "User logged in");

    let payload = AuthPayload {
        user: UserView::from(&credentials.user),
        token,
    };
    Ok(Json(ApiResponse::ok(payload).with_message("Login successful")))
}

/// GET /api/auth/profile - The authenticated user's profile
#[utoipa::path(
    get,
    path = "/api/auth/profile",
    responses(
        (status = 200, description = "Profile, wrapped in the success envelope", body = ProfilePayload),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 404, description = "User no longer exists", body = ErrorBody)
    ),
    security(("bearer" = []))
)]
pub async fn profile_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .db
        .get_user_by_id(user.user_id)
        .await
        .map_err(|e| match e {
            PortError::NotFound(_) => ApiError::NotFound("User not found".to_string()),
            other => other.into(),
        })?;

    let view = UserView {
        created_at: Some(user.created_at),
        ..UserView::from(&user)
    };
    Ok(Json(ApiResponse::ok(ProfilePayload { user: view })))
}

/// POST /api/auth/logout - Revoke the presented bearer token
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Logout successful"),
        (status = 401, description = "Missing or invalid token", body = ErrorBody)
    ),
    security(("bearer" = []))
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse, ApiError> {
    state.db.delete_auth_session(&user.token).await?;
    info!(user_id = %user.user_id, "User logged out");
    Ok(Json(ApiResponse::message_only("Logged out successfully")))
}
