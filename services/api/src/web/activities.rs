//! services/api/src/web/activities.rs
//!
//! The activity history: recent AI runs resolved to their document names.

use axum::{extract::State, response::IntoResponse, Extension, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use study_assistant_core::{domain::ActivityEntry, FeatureType};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{ApiError, ErrorBody};
use crate::web::middleware::AuthUser;
use crate::web::rest::ApiResponse;
use crate::web::state::AppState;

/// How many of the most recent activities are listed.
pub const RECENT_ACTIVITY_LIMIT: i64 = 50;

const UNKNOWN_DOCUMENT_NAME: &str = "Unknown";

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActivityView {
    pub id: Uuid,
    pub file_id: Uuid,
    pub file_name: String,
    #[serde(rename = "type")]
    #[schema(value_type = String)]
    pub feature: FeatureType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<ActivityEntry> for ActivityView {
    fn from(entry: ActivityEntry) -> Self {
        Self {
            id: entry.id,
            file_id: entry.document_id,
            file_name: entry
                .document_name
                .unwrap_or_else(|| UNKNOWN_DOCUMENT_NAME.to_string()),
            feature: entry.feature,
            question: entry.question,
            created_at: entry.created_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct ActivityListPayload {
    pub activities: Vec<ActivityView>,
}

/// GET /api/activities - The current user's most recent AI activities
#[utoipa::path(
    get,
    path = "/api/activities",
    responses(
        (status = 200, description = "Newest first, wrapped in the success envelope", body = ActivityListPayload),
        (status = 401, description = "Missing or invalid token", body = ErrorBody)
    ),
    security(("bearer" = []))
)]
pub async fn list_activities_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse, ApiError> {
    let activities = state
        .db
        .list_recent_activities(user.user_id, RECENT_ACTIVITY_LIMIT)
        .await?
        .into_iter()
        .map(ActivityView::from)
        .collect();
    Ok(Json(ApiResponse::ok(ActivityListPayload { activities })))
}
