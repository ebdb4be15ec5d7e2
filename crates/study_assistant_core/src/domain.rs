//! crates/study_assistant_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or transport format.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::features::FeatureType;

// Represents a user - used throughout app
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Only used internally for login/signup - contains sensitive data
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user: User,
    pub password_hash: String,
}

/// Everything needed to insert a new user row. The email is expected to be
/// lower-cased already.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub password_hash: String,
}

/// An opaque bearer credential bound to a user until `expires_at`.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub token: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

/// A text document uploaded by a user. Immutable after upload.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: Uuid,
    pub user_id: Uuid,
    pub original_name: String,
    pub stored_name: String,
    pub mime_type: String,
    pub size_bytes: u64,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Document {
    /// The ownership rule: there is no sharing, only the uploader may read it.
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }
}

/// Listing view of a document, without its content.
#[derive(Debug, Clone)]
pub struct DocumentSummary {
    pub id: Uuid,
    pub original_name: String,
    pub size_bytes: u64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewDocument {
    pub user_id: Uuid,
    pub original_name: String,
    pub stored_name: String,
    pub mime_type: String,
    pub size_bytes: u64,
    pub content: String,
}

/// One AI feature invocation and its normalized result. Append-only.
#[derive(Debug, Clone)]
pub struct Activity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub document_id: Uuid,
    pub feature: FeatureType,
    pub result: serde_json::Value,
    pub question: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewActivity {
    pub user_id: Uuid,
    pub document_id: Uuid,
    pub feature: FeatureType,
    pub result: serde_json::Value,
    pub question: Option<String>,
}

/// An activity resolved against its document's display name for history views.
#[derive(Debug, Clone)]
pub struct ActivityEntry {
    pub id: Uuid,
    pub document_id: Uuid,
    pub document_name: Option<String>,
    pub feature: FeatureType,
    pub question: Option<String>,
    pub created_at: DateTime<Utc>,
}
