//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use study_assistant_core::domain::{
    Activity, ActivityEntry, AuthSession, Document, DocumentSummary, NewActivity, NewDocument,
    NewUser, User, UserCredentials,
};
use study_assistant_core::features::FeatureType;
use study_assistant_core::ports::{DatabaseService, PortError, PortResult};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

fn not_found_or_unexpected(e: sqlx::Error, what: impl FnOnce() -> String) -> PortError {
    match e {
        sqlx::Error::RowNotFound => PortError::NotFound(what()),
        other => unexpected(other),
    }
}

fn parse_feature(raw: &str) -> PortResult<FeatureType> {
    raw.parse::<FeatureType>()
        .map_err(|e| PortError::Unexpected(e.to_string()))
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    id: Uuid,
    email: String,
    name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}
impl UserRecord {
    fn to_domain(self) -> User {
        User {
            id: self.id,
            email: self.email,
            name: self.name,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(FromRow)]
struct UserCredentialsRecord {
    #[sqlx(flatten)]
    user: UserRecord,
    password_hash: String,
}
impl UserCredentialsRecord {
    fn to_domain(self) -> UserCredentials {
        UserCredentials {
            user: self.user.to_domain(),
            password_hash: self.password_hash,
        }
    }
}

#[derive(FromRow)]
struct DocumentRecord {
    id: Uuid,
    user_id: Uuid,
    original_name: String,
    stored_name: String,
    mime_type: String,
    size_bytes: i64,
    content: String,
    created_at: DateTime<Utc>,
}
impl DocumentRecord {
    fn to_domain(self) -> Document {
        Document {
            id: self.id,
            user_id: self.user_id,
            original_name: self.original_name,
            stored_name: self.stored_name,
            mime_type: self.mime_type,
            size_bytes: self.size_bytes.max(0) as u64,
            content: self.content,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct DocumentSummaryRecord {
    id: Uuid,
    original_name: String,
    size_bytes: i64,
    created_at: DateTime<Utc>,
}
impl DocumentSummaryRecord {
    fn to_domain(self) -> DocumentSummary {
        DocumentSummary {
            id: self.id,
            original_name: self.original_name,
            size_bytes: self.size_bytes.max(0) as u64,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct ActivityRecord {
    id: Uuid,
    user_id: Uuid,
    document_id: Uuid,
    feature_type: String,
    result: serde_json::Value,
    question: Option<String>,
    created_at: DateTime<Utc>,
}
impl ActivityRecord {
    fn to_domain(self) -> PortResult<Activity> {
        Ok(Activity {
            id: self.id,
            user_id: self.user_id,
            document_id: self.document_id,
            feature: parse_feature(&self.feature_type)?,
            result: self.result,
            question: self.question,
            created_at: self.created_at,
        })
    }
}

#[derive(FromRow)]
struct ActivityEntryRecord {
    id: Uuid,
    document_id: Uuid,
    document_name: Option<String>,
    feature_type: String,
    question: Option<String>,
    created_at: DateTime<Utc>,
}
impl ActivityEntryRecord {
    fn to_domain(self) -> PortResult<ActivityEntry> {
        Ok(ActivityEntry {
            id: self.id,
            document_id: self.document_id,
            document_name: self.document_name,
            feature: parse_feature(&self.feature_type)?,
            question: self.question,
            created_at: self.created_at,
        })
    }
}

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn create_user(&self, new_user: NewUser) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "INSERT INTO users (id, email, name, password_hash) VALUES ($1, $2, $3, $4) \
             RETURNING id, email, name, created_at, updated_at",
        )
        .bind(Uuid::new_v4())
        .bind(&new_user.email)
        .bind(&new_user.name)
        .bind(&new_user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return PortError::Conflict("User with this email already exists".to_string());
                }
            }
            unexpected(e)
        })?;
        Ok(record.to_domain())
    }

    async fn get_user_by_id(&self, user_id: Uuid) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT id, email, name, created_at, updated_at FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| not_found_or_unexpected(e, || format!("User {} not found", user_id)))?;
        Ok(record.to_domain())
    }

    async fn get_user_credentials_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        let record = sqlx::query_as::<_, UserCredentialsRecord>(
            "SELECT id, email, name, created_at, updated_at, password_hash \
             FROM users WHERE lower(email) = lower($1)",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| not_found_or_unexpected(e, || "User not found".to_string()))?;
        Ok(record.to_domain())
    }

    async fn create_auth_session(&self, session: &AuthSession) -> PortResult<()> {
        sqlx::query("INSERT INTO auth_sessions (id, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(&session.token)
            .bind(session.user_id)
            .bind(session.expires_at)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn validate_auth_session(&self, token: &str) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT u.id, u.email, u.name, u.created_at, u.updated_at \
             FROM auth_sessions s JOIN users u ON u.id = s.user_id \
             WHERE s.id = $1 AND s.expires_at > now()",
        )
        .bind(token)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::Unauthorized,
            other => unexpected(other),
        })?;
        Ok(record.to_domain())
    }

    async fn delete_auth_session(&self, token: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE id = $1")
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn create_document(&self, new_document: NewDocument) -> PortResult<Document> {
        let size_bytes = i64::try_from(new_document.size_bytes)
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        let record = sqlx::query_as::<_, DocumentRecord>(
            "INSERT INTO documents (id, user_id, original_name, stored_name, mime_type, size_bytes, content) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING id, user_id, original_name, stored_name, mime_type, size_bytes, content, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(new_document.user_id)
        .bind(&new_document.original_name)
        .bind(&new_document.stored_name)
        .bind(&new_document.mime_type)
        .bind(size_bytes)
        .bind(&new_document.content)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn get_document_by_id(&self, document_id: Uuid) -> PortResult<Document> {
        let record = sqlx::query_as::<_, DocumentRecord>(
            "SELECT id, user_id, original_name, stored_name, mime_type, size_bytes, content, created_at \
             FROM documents WHERE id = $1",
        )
        .bind(document_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| not_found_or_unexpected(e, || format!("Document {} not found", document_id)))?;
        Ok(record.to_domain())
    }

    async fn list_documents_for_user(&self, user_id: Uuid) -> PortResult<Vec<DocumentSummary>> {
        let records = sqlx::query_as::<_, DocumentSummaryRecord>(
            "SELECT id, original_name, size_bytes, created_at FROM documents \
             WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn record_activity(&self, new_activity: NewActivity) -> PortResult<Activity> {
        let record = sqlx::query_as::<_, ActivityRecord>(
            "INSERT INTO activities (id, user_id, document_id, feature_type, result, question) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING id, user_id, document_id, feature_type, result, question, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(new_activity.user_id)
        .bind(new_activity.document_id)
        .bind(new_activity.feature.as_str())
        .bind(&new_activity.result)
        .bind(&new_activity.question)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        record.to_domain()
    }

    async fn list_recent_activities(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> PortResult<Vec<ActivityEntry>> {
        let records = sqlx::query_as::<_, ActivityEntryRecord>(
            "SELECT a.id, a.document_id, d.original_name AS document_name, a.feature_type, \
                    a.question, a.created_at \
             FROM activities a LEFT JOIN documents d ON d.id = a.document_id \
             WHERE a.user_id = $1 ORDER BY a.created_at DESC LIMIT $2",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        records.into_iter().map(|r| r.to_domain()).collect()
    }
}
