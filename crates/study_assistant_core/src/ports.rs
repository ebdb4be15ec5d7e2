//! crates/study_assistant_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or APIs.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    Activity, ActivityEntry, AuthSession, Document, DocumentSummary, NewActivity, NewDocument,
    NewUser, User, UserCredentials,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Unauthorized")]
    Unauthorized,
    /// The completion provider failed (network, auth, quota, empty reply).
    #[error("Completion provider error: {0}")]
    Provider(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- User Management ---
    /// Fails with `PortError::Conflict` when the email is already registered.
    async fn create_user(&self, new_user: NewUser) -> PortResult<User>;

    async fn get_user_by_id(&self, user_id: Uuid) -> PortResult<User>;

    async fn get_user_credentials_by_email(&self, email: &str) -> PortResult<UserCredentials>;

    // --- Auth Sessions ---
    async fn create_auth_session(&self, session: &AuthSession) -> PortResult<()>;

    /// Resolves an unexpired token to its user; unknown or expired tokens fail
    /// with `PortError::Unauthorized`.
    async fn validate_auth_session(&self, token: &str) -> PortResult<User>;

    async fn delete_auth_session(&self, token: &str) -> PortResult<()>;

    // --- Document Management ---
    async fn create_document(&self, new_document: NewDocument) -> PortResult<Document>;

    async fn get_document_by_id(&self, document_id: Uuid) -> PortResult<Document>;

    /// The user's documents, newest first.
    async fn list_documents_for_user(&self, user_id: Uuid) -> PortResult<Vec<DocumentSummary>>;

    // --- Activity History ---
    async fn record_activity(&self, new_activity: NewActivity) -> PortResult<Activity>;

    /// At most `limit` of the user's activities, newest first.
    async fn list_recent_activities(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> PortResult<Vec<ActivityEntry>>;
}

#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Sends one prompt to the text model and returns its raw reply.
    /// A single attempt; failures surface as `PortError::Provider`.
    async fn complete(&self, prompt: &str) -> PortResult<String>;
}
