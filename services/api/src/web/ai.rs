//! services/api/src/web/ai.rs
//!
//! The eight AI feature endpoints. Every handler follows the same pipeline:
//! ownership guard, prompt, one completion call, normalization, activity
//! record, response. A failure at any step means no activity is written.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use study_assistant_core::{
    domain::NewActivity,
    features::{
        AskQuestion, BulletPoints, Feature, Flashcards, Glossary, Insights, Quiz, RelatedTopics,
        Summarize, DEFAULT_MAX_POINTS, DEFAULT_NUMBER_OF_CARDS, DEFAULT_NUMBER_OF_QUESTIONS,
        MAX_QUESTION_CHARS, MAX_REQUESTED_ITEMS,
    },
};
use tracing::{info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{ApiError, ErrorBody, ValidationIssue};
use crate::web::extract::{check_count, Validate, ValidatedJson};
use crate::web::middleware::{load_owned_document, AuthUser};
use crate::web::rest::ApiResponse;
use crate::web::state::AppState;

//=========================================================================================
// Request Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulletPointsRequest {
    pub max_points: Option<i64>,
}

impl Validate for BulletPointsRequest {
    fn validate(&self) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        check_count(&mut issues, "maxPoints", self.max_points, MAX_REQUESTED_ITEMS);
        issues
    }
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuizRequest {
    pub number_of_questions: Option<i64>,
}

impl Validate for QuizRequest {
    fn validate(&self) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        check_count(
            &mut issues,
            "numberOfQuestions",
            self.number_of_questions,
            MAX_REQUESTED_ITEMS,
        );
        issues
    }
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FlashcardsRequest {
    pub number_of_cards: Option<i64>,
}

impl Validate for FlashcardsRequest {
    fn validate(&self) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        check_count(
            &mut issues,
            "numberOfCards",
            self.number_of_cards,
            MAX_REQUESTED_ITEMS,
        );
        issues
    }
}

#[derive(Deserialize, ToSchema)]
pub struct AskQuestionRequest {
    pub question: String,
}

impl Validate for AskQuestionRequest {
    fn validate(&self) -> Vec<ValidationIssue> {
        let question = self.question.trim();
        if question.is_empty() {
            vec![ValidationIssue::new("question", "Question is required")]
        } else if question.chars().count() > MAX_QUESTION_CHARS {
            vec![ValidationIssue::new(
                "question",
                format!("Question must be at most {} characters", MAX_QUESTION_CHARS),
            )]
        } else {
            Vec::new()
        }
    }
}

/// A validated count parameter, or the feature's default.
fn count_or(value: Option<i64>, default: usize) -> usize {
    value.map_or(default, |n| n as usize)
}

//=========================================================================================
// The Shared Pipeline
//=========================================================================================

/// A feature result with the document id (and question) alongside it.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureResponse<T> {
    #[serde(flatten)]
    pub result: T,
    pub file_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
}

async fn run_feature<F: Feature>(
    state: &AppState,
    user: &AuthUser,
    file_id: &str,
    feature: F,
) -> Result<Json<ApiResponse<FeatureResponse<F::Output>>>, ApiError> {
    let kind = F::KIND;

    // 1. Ownership guard
    let document = load_owned_document(state, user, file_id).await?;
    info!(user_id = %user.user_id, file_id = %document.id, feature = %kind, "Running AI feature");

    // 2. Prompt and a single completion call
    let prompt = feature.prompt(&document.content);
    let raw = state.completion.complete(&prompt).await?;

    // 3. Normalize the reply into the typed result
    let output = feature.normalize(&raw).map_err(|e| {
        warn!(file_id = %document.id, feature = %kind, raw_len = raw.len(), "Unusable AI response: {}", e);
        ApiError::from(e)
    })?;

    // 4. Record the activity only once the result is known to be valid
    let result = serde_json::to_value(&output)
        .map_err(|e| ApiError::Internal(format!("Failed to serialize {} result: {}", kind, e)))?;
    let question = feature.question().map(str::to_string);
    state
        .db
        .record_activity(NewActivity {
            user_id: user.user_id,
            document_id: document.id,
            feature: kind,
            result,
            question: question.clone(),
        })
        .await?;

    info!(user_id = %user.user_id, file_id = %document.id, feature = %kind, "AI feature completed");
    Ok(Json(ApiResponse::ok(FeatureResponse {
        result: output,
        file_id: document.id,
        question,
    })))
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /api/ai/summarize/{file_id}
#[utoipa::path(
    post,
    path = "/api/ai/summarize/{file_id}",
    params(("file_id" = String, Path, description = "Document id")),
    responses(
        (status = 200, description = "`{summary, wordCount, fileId}` in the success envelope"),
        (status = 401, description = "Not the owner, or missing token", body = ErrorBody),
        (status = 404, description = "Unknown document", body = ErrorBody),
        (status = 500, description = "Provider or normalization failure", body = ErrorBody)
    ),
    security(("bearer" = []))
)]
pub async fn summarize_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(file_id): Path<String>,
) -> Result<Json<ApiResponse<FeatureResponse<<Summarize as Feature>::Output>>>, ApiError> {
    run_feature(&state, &user, &file_id, Summarize).await
}

/// POST /api/ai/bullet-points/{file_id}
#[utoipa::path(
    post,
    path = "/api/ai/bullet-points/{file_id}",
    params(("file_id" = String, Path, description = "Document id")),
    request_body(content = BulletPointsRequest, description = "Optional; `maxPoints` defaults to 10"),
    responses(
        (status = 200, description = "`{bulletPoints, totalPoints, fileId}` in the success envelope"),
        (status = 400, description = "Invalid parameters", body = ErrorBody),
        (status = 401, description = "Not the owner, or missing token", body = ErrorBody),
        (status = 404, description = "Unknown document", body = ErrorBody)
    ),
    security(("bearer" = []))
)]
pub async fn bullet_points_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(file_id): Path<String>,
    ValidatedJson(req): ValidatedJson<BulletPointsRequest>,
) -> Result<Json<ApiResponse<FeatureResponse<<BulletPoints as Feature>::Output>>>, ApiError> {
    let feature = BulletPoints {
        max_points: count_or(req.max_points, DEFAULT_MAX_POINTS),
    };
    run_feature(&state, &user, &file_id, feature).await
}

/// POST /api/ai/quiz/{file_id}
#[utoipa::path(
    post,
    path = "/api/ai/quiz/{file_id}",
    params(("file_id" = String, Path, description = "Document id")),
    request_body(content = QuizRequest, description = "Optional; `numberOfQuestions` defaults to 5"),
    responses(
        (status = 200, description = "`{questions, totalQuestions, fileId}` in the success envelope"),
        (status = 400, description = "Invalid parameters", body = ErrorBody),
        (status = 401, description = "Not the owner, or missing token", body = ErrorBody),
        (status = 404, description = "Unknown document", body = ErrorBody),
        (status = 500, description = "Provider or normalization failure", body = ErrorBody)
    ),
    security(("bearer" = []))
)]
pub async fn quiz_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(file_id): Path<String>,
    ValidatedJson(req): ValidatedJson<QuizRequest>,
) -> Result<Json<ApiResponse<FeatureResponse<<Quiz as Feature>::Output>>>, ApiError> {
    let feature = Quiz {
        number_of_questions: count_or(req.number_of_questions, DEFAULT_NUMBER_OF_QUESTIONS),
    };
    run_feature(&state, &user, &file_id, feature).await
}

/// POST /api/ai/insights/{file_id}
#[utoipa::path(
    post,
    path = "/api/ai/insights/{file_id}",
    params(("file_id" = String, Path, description = "Document id")),
    responses(
        (status = 200, description = "`{insights, mainTheme, targetAudience, fileId}` in the success envelope"),
        (status = 401, description = "Not the owner, or missing token", body = ErrorBody),
        (status = 404, description = "Unknown document", body = ErrorBody),
        (status = 500, description = "Provider or normalization failure", body = ErrorBody)
    ),
    security(("bearer" = []))
)]
pub async fn insights_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(file_id): Path<String>,
) -> Result<Json<ApiResponse<FeatureResponse<<Insights as Feature>::Output>>>, ApiError> {
    run_feature(&state, &user, &file_id, Insights).await
}

/// POST /api/ai/flashcards/{file_id}
#[utoipa::path(
    post,
    path = "/api/ai/flashcards/{file_id}",
    params(("file_id" = String, Path, description = "Document id")),
    request_body(content = FlashcardsRequest, description = "Optional; `numberOfCards` defaults to 10"),
    responses(
        (status = 200, description = "`{flashcards, totalCards, fileId}` in the success envelope"),
        (status = 400, description = "Invalid parameters", body = ErrorBody),
        (status = 401, description = "Not the owner, or missing token", body = ErrorBody),
        (status = 404, description = "Unknown document", body = ErrorBody),
        (status = 500, description = "Provider or normalization failure", body = ErrorBody)
    ),
    security(("bearer" = []))
)]
pub async fn flashcards_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(file_id): Path<String>,
    ValidatedJson(req): ValidatedJson<FlashcardsRequest>,
) -> Result<Json<ApiResponse<FeatureResponse<<Flashcards as Feature>::Output>>>, ApiError> {
    let feature = Flashcards {
        number_of_cards: count_or(req.number_of_cards, DEFAULT_NUMBER_OF_CARDS),
    };
    run_feature(&state, &user, &file_id, feature).await
}

/// POST /api/ai/glossary/{file_id}
#[utoipa::path(
    post,
    path = "/api/ai/glossary/{file_id}",
    params(("file_id" = String, Path, description = "Document id")),
    responses(
        (status = 200, description = "`{terms, totalTerms, fileId}` in the success envelope"),
        (status = 401, description = "Not the owner, or missing token", body = ErrorBody),
        (status = 404, description = "Unknown document", body = ErrorBody),
        (status = 500, description = "Provider or normalization failure", body = ErrorBody)
    ),
    security(("bearer" = []))
)]
pub async fn glossary_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(file_id): Path<String>,
) -> Result<Json<ApiResponse<FeatureResponse<<Glossary as Feature>::Output>>>, ApiError> {
    run_feature(&state, &user, &file_id, Glossary).await
}

/// POST /api/ai/related-topics/{file_id}
#[utoipa::path(
    post,
    path = "/api/ai/related-topics/{file_id}",
    params(("file_id" = String, Path, description = "Document id")),
    responses(
        (status = 200, description = "`{topics, prerequisites, advancedTopics, fileId}` in the success envelope"),
        (status = 401, description = "Not the owner, or missing token", body = ErrorBody),
        (status = 404, description = "Unknown document", body = ErrorBody),
        (status = 500, description = "Provider or normalization failure", body = ErrorBody)
    ),
    security(("bearer" = []))
)]
pub async fn related_topics_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(file_id): Path<String>,
) -> Result<Json<ApiResponse<FeatureResponse<<RelatedTopics as Feature>::Output>>>, ApiError> {
    run_feature(&state, &user, &file_id, RelatedTopics).await
}

/// POST /api/ai/ask/{file_id}
#[utoipa::path(
    post,
    path = "/api/ai/ask/{file_id}",
    params(("file_id" = String, Path, description = "Document id")),
    request_body = AskQuestionRequest,
    responses(
        (status = 200, description = "`{answer, confidence, relevantQuotes, fileId, question}` in the success envelope"),
        (status = 400, description = "Blank or overlong question", body = ErrorBody),
        (status = 401, description = "Not the owner, or missing token", body = ErrorBody),
        (status = 404, description = "Unknown document", body = ErrorBody),
        (status = 500, description = "Provider or normalization failure", body = ErrorBody)
    ),
    security(("bearer" = []))
)]
pub async fn ask_question_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(file_id): Path<String>,
    ValidatedJson(req): ValidatedJson<AskQuestionRequest>,
) -> Result<Json<ApiResponse<FeatureResponse<<AskQuestion as Feature>::Output>>>, ApiError> {
    let feature = AskQuestion {
        question: req.question.trim().to_string(),
    };
    run_feature(&state, &user, &file_id, feature).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use study_assistant_core::features::SummaryResult;

    #[test]
    fn feature_results_are_flattened_next_to_the_file_id() {
        let file_id = Uuid::nil();
        let response = FeatureResponse {
            result: SummaryResult {
                summary: "Short.".to_string(),
                word_count: 1,
            },
            file_id,
            question: None,
        };
        assert_eq!(
            serde_json::to_value(response).unwrap(),
            json!({ "summary": "Short.", "wordCount": 1, "fileId": file_id })
        );
    }

    #[test]
    fn questions_must_be_present_and_bounded() {
        let ask = |q: &str| AskQuestionRequest { question: q.to_string() };
        assert!(ask("What is ATP?").validate().is_empty());
        assert_eq!(ask("   ").validate().len(), 1);
        assert_eq!(ask(&"q".repeat(MAX_QUESTION_CHARS + 1)).validate().len(), 1);
        assert!(ask(&"q".repeat(MAX_QUESTION_CHARS)).validate().is_empty());
    }

    #[test]
    fn absent_counts_fall_back_to_defaults() {
        assert_eq!(count_or(None, DEFAULT_NUMBER_OF_QUESTIONS), 5);
        assert_eq!(count_or(Some(3), DEFAULT_NUMBER_OF_QUESTIONS), 3);
    }
}
