//! Shared harness for the router integration tests: in-memory port fakes and
//! small request helpers.

#![allow(dead_code)]

use api_lib::config::Config;
use api_lib::web::{build_router, AppState};
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use study_assistant_core::{
    domain::{
        Activity, ActivityEntry, AuthSession, Document, DocumentSummary, NewActivity,
        NewDocument, NewUser, User, UserCredentials,
    },
    ports::{CompletionService, DatabaseService, PortError, PortResult},
};
use tower::ServiceExt;
use uuid::Uuid;

//=========================================================================================
// In-memory DatabaseService
//=========================================================================================

#[derive(Default)]
struct Store {
    users: Vec<UserCredentials>,
    sessions: HashMap<String, AuthSession>,
    documents: Vec<Document>,
    activities: Vec<Activity>,
}

#[derive(Default)]
pub struct FakeDb {
    store: Mutex<Store>,
}

impl FakeDb {
    pub fn document_count(&self) -> usize {
        self.store.lock().unwrap().documents.len()
    }

    pub fn activities(&self) -> Vec<Activity> {
        self.store.lock().unwrap().activities.clone()
    }

    /// Pushes every session of `user_id` into the past.
    pub fn expire_sessions(&self, user_id: Uuid) {
        let mut store = self.store.lock().unwrap();
        for session in store.sessions.values_mut() {
            if session.user_id == user_id {
                session.expires_at = Utc::now() - Duration::minutes(1);
            }
        }
    }
}

#[async_trait]
impl DatabaseService for FakeDb {
    async fn create_user(&self, new_user: NewUser) -> PortResult<User> {
        let mut store = self.store.lock().unwrap();
        if store
            .users
            .iter()
            .any(|c| c.user.email.eq_ignore_ascii_case(&new_user.email))
        {
            return Err(PortError::Conflict("User with this email already exists".into()));
        }
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: new_user.email,
            name: new_user.name,
            created_at: now,
            updated_at: now,
        };
        store.users.push(UserCredentials {
            user: user.clone(),
            password_hash: new_user.password_hash,
        });
        Ok(user)
    }

    async fn get_user_by_id(&self, user_id: Uuid) -> PortResult<User> {
        let store = self.store.lock().unwrap();
        store
            .users
            .iter()
            .find(|c| c.user.id == user_id)
            .map(|c| c.user.clone())
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", user_id)))
    }

    async fn get_user_credentials_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        let store = self.store.lock().unwrap();
        store
            .users
            .iter()
            .find(|c| c.user.email.eq_ignore_ascii_case(email))
            .cloned()
            .ok_or_else(|| PortError::NotFound("User not found".into()))
    }

    async fn create_auth_session(&self, session: &AuthSession) -> PortResult<()> {
        let mut store = self.store.lock().unwrap();
        store.sessions.insert(session.token.clone(), session.clone());
        Ok(())
    }

    async fn validate_auth_session(&self, token: &str) -> PortResult<User> {
        let store = self.store.lock().unwrap();
        let session = store
            .sessions
            .get(token)
            .filter(|s| s.expires_at > Utc::now())
            .ok_or(PortError::Unauthorized)?;
        store
            .users
            .iter()
            .find(|c| c.user.id == session.user_id)
            .map(|c| c.user.clone())
            .ok_or(PortError::Unauthorized)
    }

    async fn delete_auth_session(&self, token: &str) -> PortResult<()> {
        self.store.lock().unwrap().sessions.remove(token);
        Ok(())
    }

    async fn create_document(&self, new_document: NewDocument) -> PortResult<Document> {
        let document = Document {
            id: Uuid::new_v4(),
            user_id: new_document.user_id,
            original_name: new_document.original_name,
            stored_name: new_document.stored_name,
            mime_type: new_document.mime_type,
            size_bytes: new_document.size_bytes,
            content: new_document.content,
            created_at: Utc::now(),
        };
        self.store.lock().unwrap().documents.push(document.clone());
        Ok(document)
    }

    async fn get_document_by_id(&self, document_id: Uuid) -> PortResult<Document> {
        let store = self.store.lock().unwrap();
        store
            .documents
            .iter()
            .find(|d| d.id == document_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Document {} not found", document_id)))
    }

    async fn list_documents_for_user(&self, user_id: Uuid) -> PortResult<Vec<DocumentSummary>> {
        let store = self.store.lock().unwrap();
        Ok(store
            .documents
            .iter()
            .rev()
            .filter(|d| d.user_id == user_id)
            .map(|d| DocumentSummary {
                id: d.id,
                original_name: d.original_name.clone(),
                size_bytes: d.size_bytes,
                created_at: d.created_at,
            })
            .collect())
    }

    async fn record_activity(&self, new_activity: NewActivity) -> PortResult<Activity> {
        let activity = Activity {
            id: Uuid::new_v4(),
            user_id: new_activity.user_id,
            document_id: new_activity.document_id,
            feature: new_activity.feature,
            result: new_activity.result,
            question: new_activity.question,
            created_at: Utc::now(),
        };
        self.store.lock().unwrap().activities.push(activity.clone());
        Ok(activity)
    }

    async fn list_recent_activities(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> PortResult<Vec<ActivityEntry>> {
        let store = self.store.lock().unwrap();
        Ok(store
            .activities
            .iter()
            .rev()
            .filter(|a| a.user_id == user_id)
            .take(limit as usize)
            .map(|a| ActivityEntry {
                id: a.id,
                document_id: a.document_id,
                document_name: store
                    .documents
                    .iter()
                    .find(|d| d.id == a.document_id)
                    .map(|d| d.original_name.clone()),
                feature: a.feature,
                question: a.question.clone(),
                created_at: a.created_at,
            })
            .collect())
    }
}

//=========================================================================================
// Scripted CompletionService
//=========================================================================================

/// Replies with queued responses in order and records every prompt it saw.
#[derive(Default)]
pub struct FakeCompletion {
    replies: Mutex<VecDeque<Result<String, String>>>,
    prompts: Mutex<Vec<String>>,
}

impl FakeCompletion {
    pub fn reply(&self, text: &str) {
        self.replies.lock().unwrap().push_back(Ok(text.to_string()));
    }

    pub fn fail(&self, message: &str) {
        self.replies.lock().unwrap().push_back(Err(message.to_string()));
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionService for FakeCompletion {
    async fn complete(&self, prompt: &str) -> PortResult<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(PortError::Provider(message)),
            None => Err(PortError::Provider("no scripted reply".into())),
        }
    }
}

//=========================================================================================
// Test App and Request Helpers
//=========================================================================================

pub struct TestApp {
    pub router: Router,
    pub db: Arc<FakeDb>,
    pub completion: Arc<FakeCompletion>,
}

fn test_config() -> Config {
    Config {
        bind_address: "127.0.0.1:0".parse().unwrap(),
        database_url: "postgres://unused".to_string(),
        database_max_connections: 1,
        log_level: tracing::Level::INFO,
        openai_api_key: None,
        completion_api_base: None,
        completion_model: "test-model".to_string(),
        session_ttl_days: 7,
        allowed_origins: vec!["http://localhost:5173".to_string()],
    }
}

impl TestApp {
    pub fn new() -> Self {
        let db = Arc::new(FakeDb::default());
        let completion = Arc::new(FakeCompletion::default());
        let state = Arc::new(AppState {
            db: db.clone(),
            completion: completion.clone(),
            config: Arc::new(test_config()),
        });
        Self {
            router: build_router(state),
            db,
            completion,
        }
    }

    /// Sends one request and returns the status with the decoded JSON body.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    /// Registers a user and returns `(token, user_id)`.
    pub async fn register(&self, email: &str) -> (String, Uuid) {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/auth/register",
                None,
                Some(serde_json::json!({
                    "email": email,
                    "password": "secret123",
                    "name": "Test User",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        let token = body["data"]["token"].as_str().unwrap().to_string();
        let user_id = body["data"]["user"]["id"].as_str().unwrap().parse().unwrap();
        (token, user_id)
    }

    /// Uploads a document and returns its id.
    pub async fn upload(&self, token: &str, file_name: &str, content: &str) -> String {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/files/upload",
                Some(token),
                Some(serde_json::json!({ "fileName": file_name, "content": content })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["data"]["file"]["id"].as_str().unwrap().to_string()
    }
}
