//! services/api/src/web/rest.rs
//!
//! The success envelope shared by every REST handler, and the master
//! definition for the OpenAPI specification.

use serde::Serialize;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::error::{ErrorBody, ValidationIssue};
use crate::web::{activities, ai, auth, files, health};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::register_handler,
        auth::login_handler,
        auth::profile_handler,
        auth::logout_handler,
        files::upload_file_handler,
        files::list_files_handler,
        files::get_file_handler,
        ai::summarize_handler,
        ai::bullet_points_handler,
        ai::quiz_handler,
        ai::insights_handler,
        ai::flashcards_handler,
        ai::glossary_handler,
        ai::related_topics_handler,
        ai::ask_question_handler,
        activities::list_activities_handler,
        health::health_handler,
    ),
    components(
        schemas(
            auth::RegisterRequest,
            auth::LoginRequest,
            auth::UserView,
            auth::AuthPayload,
            auth::ProfilePayload,
            files::UploadFileRequest,
            files::FileView,
            files::FilePayload,
            files::FileListPayload,
            ai::BulletPointsRequest,
            ai::QuizRequest,
            ai::FlashcardsRequest,
            ai::AskQuestionRequest,
            activities::ActivityView,
            activities::ActivityListPayload,
            health::HealthResponse,
            ErrorBody,
            ValidationIssue,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "Study Assistant API", description = "Document upload, AI study aids and activity history.")
    )
)]
pub struct ApiDoc;

/// Registers the `bearer` security scheme referenced by protected paths.
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
        );
    }
}

//=========================================================================================
// Success Envelope
//=========================================================================================

/// `{ "success": true, "message"?: ..., "data"?: ... }`
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl ApiResponse<()> {
    pub fn message_only(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_omits_absent_parts() {
        let body = serde_json::to_value(ApiResponse::ok(json!({ "n": 1 }))).unwrap();
        assert_eq!(body, json!({ "success": true, "data": { "n": 1 } }));

        let body = serde_json::to_value(ApiResponse::message_only("Logged out")).unwrap();
        assert_eq!(body, json!({ "success": true, "message": "Logged out" }));
    }

    #[test]
    fn openapi_document_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/auth/register",
            "/api/files/{id}",
            "/api/ai/ask/{file_id}",
            "/api/activities",
            "/api/health",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
