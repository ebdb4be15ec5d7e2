//! services/api/src/web/files.rs
//!
//! Document upload, listing and retrieval. Uploads are JSON bodies carrying
//! the file's text; only plain-text formats from a fixed allow-list are
//! accepted.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use study_assistant_core::domain::{Document, DocumentSummary, NewDocument};
use tracing::{info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{ApiError, ErrorBody, ValidationIssue};
use crate::web::extract::{Validate, ValidatedJson};
use crate::web::middleware::{load_owned_document, AuthUser};
use crate::web::rest::ApiResponse;
use crate::web::state::AppState;

/// Largest accepted document, in UTF-8 bytes.
pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

pub const SUPPORTED_EXTENSIONS: [&str; 15] = [
    ".txt", ".md", ".csv", ".json", ".xml", ".html", ".js", ".ts", ".py", ".java", ".c", ".cpp",
    ".css", ".yaml", ".yml",
];

const DEFAULT_MIME_TYPE: &str = "text/plain";

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadFileRequest {
    pub file_name: String,
    pub content: String,
    pub mime_type: Option<String>,
}

impl Validate for UploadFileRequest {
    fn validate(&self) -> Vec<ValidationIssue> {
        if self.file_name.trim().is_empty() {
            vec![ValidationIssue::new("fileName", "File name is required")]
        } else {
            Vec::new()
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileView {
    pub id: Uuid,
    pub original_name: String,
    pub size: u64,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl From<DocumentSummary> for FileView {
    fn from(summary: DocumentSummary) -> Self {
        Self {
            id: summary.id,
            original_name: summary.original_name,
            size: summary.size_bytes,
            created_at: summary.created_at,
            content: None,
        }
    }
}

impl From<Document> for FileView {
    fn from(document: Document) -> Self {
        Self {
            id: document.id,
            original_name: document.original_name,
            size: document.size_bytes,
            created_at: document.created_at,
            content: Some(document.content),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct FilePayload {
    pub file: FileView,
}

#[derive(Serialize, ToSchema)]
pub struct FileListPayload {
    pub files: Vec<FileView>,
}

//=========================================================================================
// Upload Checks
//=========================================================================================

/// The lower-cased extension of `file_name`, including the dot.
fn file_extension(file_name: &str) -> Option<String> {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| format!(".{}", ext.to_lowercase()))
}

/// Runs the upload checks in order: empty content, then extension, then size.
fn check_upload(file_name: &str, content: &str) -> Result<(), ApiError> {
    if content.trim().is_empty() {
        return Err(ApiError::BadRequest("File content cannot be empty".to_string()));
    }

    let supported = file_extension(file_name)
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()));
    if !supported {
        return Err(ApiError::BadRequest(format!(
            "Unsupported file type. Supported types: {}",
            SUPPORTED_EXTENSIONS.join(", ")
        )));
    }

    if content.len() > MAX_FILE_SIZE {
        return Err(ApiError::BadRequest(format!(
            "File too large. Maximum size is {} MB",
            MAX_FILE_SIZE / (1024 * 1024)
        )));
    }
    Ok(())
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /api/files/upload - Store a text document for the current user
#[utoipa::path(
    post,
    path = "/api/files/upload",
    request_body = UploadFileRequest,
    responses(
        (status = 201, description = "File stored, wrapped in the success envelope", body = FilePayload),
        (status = 400, description = "Empty, unsupported or oversized file", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody)
    ),
    security(("bearer" = []))
)]
pub async fn upload_file_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    ValidatedJson(req): ValidatedJson<UploadFileRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if let Err(e) = check_upload(&req.file_name, &req.content) {
        warn!(user_id = %user.user_id, file_name = %req.file_name, "Upload rejected: {}", e);
        return Err(e);
    }

    let size_bytes = req.content.len() as u64;
    let document = state
        .db
        .create_document(NewDocument {
            user_id: user.user_id,
            stored_name: format!("{}-{}", Uuid::new_v4(), req.file_name),
            original_name: req.file_name,
            mime_type: req
                .mime_type
                .filter(|mime| !mime.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string()),
            size_bytes,
            content: req.content,
        })
        .await?;

    info!(user_id = %user.user_id, file_id = %document.id, size_bytes, "File uploaded");

    // The upload response echoes metadata only.
    let file = FileView {
        content: None,
        ..FileView::from(document)
    };
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(FilePayload { file }).with_message("File uploaded successfully")),
    ))
}

/// GET /api/files - The current user's documents, newest first
#[utoipa::path(
    get,
    path = "/api/files",
    responses(
        (status = 200, description = "Documents without content, wrapped in the success envelope", body = FileListPayload),
        (status = 401, description = "Missing or invalid token", body = ErrorBody)
    ),
    security(("bearer" = []))
)]
pub async fn list_files_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse, ApiError> {
    let files = state
        .db
        .list_documents_for_user(user.user_id)
        .await?
        .into_iter()
        .map(FileView::from)
        .collect();
    Ok(Json(ApiResponse::ok(FileListPayload { files })))
}

/// GET /api/files/{id} - One document with its full content
#[utoipa::path(
    get,
    path = "/api/files/{id}",
    params(("id" = String, Path, description = "Document id")),
    responses(
        (status = 200, description = "The document, wrapped in the success envelope", body = FilePayload),
        (status = 401, description = "Not the owner, or missing token", body = ErrorBody),
        (status = 404, description = "Unknown or malformed id", body = ErrorBody)
    ),
    security(("bearer" = []))
)]
pub async fn get_file_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let document = load_owned_document(&state, &user, &id).await?;
    Ok(Json(ApiResponse::ok(FilePayload {
        file: FileView::from(document),
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extensions_are_taken_after_the_last_dot_and_lower_cased() {
        assert_eq!(file_extension("notes.backup.MD").as_deref(), Some(".md"));
        assert_eq!(file_extension("README"), None);
    }

    #[test]
    fn upload_checks_run_in_order() {
        // Empty content wins over a bad extension.
        let err = check_upload("slides.pdf", "   ").unwrap_err();
        assert_eq!(err.to_string(), "File content cannot be empty");

        // A bad extension wins over the size limit.
        let huge = "a".repeat(MAX_FILE_SIZE + 1);
        let err = check_upload("slides.pdf", &huge).unwrap_err();
        assert!(err.to_string().starts_with("Unsupported file type"));

        let err = check_upload("notes.txt", &huge).unwrap_err();
        assert!(err.to_string().starts_with("File too large"));

        assert!(check_upload("notes.TXT", "hello").is_ok());
    }

    #[test]
    fn size_is_measured_in_bytes() {
        // 'é' is two bytes in UTF-8.
        let content = "é".repeat(MAX_FILE_SIZE / 2 + 1);
        assert!(check_upload("notes.txt", &content).is_err());
    }
}
