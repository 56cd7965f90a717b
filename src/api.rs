//! HTTP JSON API — router and handlers for the todo + chat endpoints.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::annotator::Annotator;
use crate::config::RuntimeConfig;
use crate::error::{LlmError, StoreError};
use crate::store::TodoStore;
use crate::todos::TodoItem;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TodoStore>,
    /// AI annotator (None if no completion-service credential is configured).
    pub annotator: Option<Arc<Annotator>>,
    /// Settings handed to the browser client via `/api/config`.
    pub runtime: RuntimeConfig,
    pub deployment_id: String,
}

/// Build the Axum router with all API routes.
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/config", get(runtime_config))
        .route("/api/todos", get(list_todos).post(create_todo))
        .route(
            "/api/todos/{id}",
            put(update_todo).patch(update_todo).delete(delete_todo),
        )
        .route("/api/chat", post(chat))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ── Errors ──────────────────────────────────────────────────────────────

/// Handler-level error, mapped onto an HTTP status and a JSON body.
#[derive(Debug)]
enum ApiError {
    MissingField(&'static str),
    Store(StoreError),
    Llm(LlmError),
    AnnotatorDisabled,
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

impl From<LlmError> for ApiError {
    fn from(e: LlmError) -> Self {
        Self::Llm(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::MissingField(field) => (
                StatusCode::BAD_REQUEST,
                format!("Missing required field: {field}"),
            ),
            Self::Store(StoreError::EmptyText) => {
                (StatusCode::BAD_REQUEST, StoreError::EmptyText.to_string())
            }
            Self::Store(e @ StoreError::NotFound { .. }) => {
                (StatusCode::NOT_FOUND, e.to_string())
            }
            Self::Store(e) => {
                warn!(error = %e, "Store failure");
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
            Self::Llm(e) => {
                warn!(error = %e, "Upstream completion failure");
                (StatusCode::BAD_GATEWAY, e.to_string())
            }
            Self::AnnotatorDisabled => (
                StatusCode::SERVICE_UNAVAILABLE,
                "AI annotator is not configured".to_string(),
            ),
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

// ── Request / response bodies ───────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct CreateTodoRequest {
    /// Task label. Older clients send this field as `description`.
    #[serde(default, alias = "description")]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UpdateTodoRequest {
    #[serde(default)]
    completed: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ChatResponse {
    ai_response: String,
    todo: TodoItem,
}

// ── Handlers ────────────────────────────────────────────────────────────

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "todo-assist",
        "deployment": state.deployment_id,
    }))
}

async fn runtime_config(State(state): State<AppState>) -> Json<RuntimeConfig> {
    Json(state.runtime)
}

async fn list_todos(State(state): State<AppState>) -> Result<Json<Vec<TodoItem>>, ApiError> {
    let todos = state.store.list_todos().await?;
    Ok(Json(todos))
}

async fn create_todo(
    State(state): State<AppState>,
    Json(body): Json<CreateTodoRequest>,
) -> Result<Json<TodoItem>, ApiError> {
    let text = body.text.ok_or(ApiError::MissingField("text"))?;
    let todo = state.store.create_todo(&text).await?;
    info!(id = todo.id, "Todo created via API");
    Ok(Json(todo))
}

async fn update_todo(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateTodoRequest>,
) -> Result<Json<TodoItem>, ApiError> {
    let completed = body.completed.ok_or(ApiError::MissingField("completed"))?;
    let todo = state.store.set_completion(id, completed).await?;
    Ok(Json(todo))
}

async fn delete_todo(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    // Idempotent: deleting an absent id is still a success.
    state.store.delete_todo(id).await?;
    Ok(Json(serde_json::json!({ "success": true })))
}

async fn chat(
    State(state): State<AppState>,
    Json(body): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let message = body
        .message
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .ok_or(ApiError::MissingField("message"))?;

    let annotator = state.annotator.as_ref().ok_or(ApiError::AnnotatorDisabled)?;

    // If the upstream call fails, nothing is persisted.
    let text = annotator.annotate(message).await?;
    let todo = state.store.create_todo(&text).await?;
    info!(id = todo.id, "Todo created via annotator");

    Ok(Json(ChatResponse {
        ai_response: text,
        todo,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_status_mapping() {
        let cases = [
            (ApiError::MissingField("text"), StatusCode::BAD_REQUEST),
            (
                ApiError::Store(StoreError::EmptyText),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::Store(StoreError::NotFound { id: 7 }),
                StatusCode::NOT_FOUND,
            ),
            (
                ApiError::Store(StoreError::Query("boom".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ApiError::Llm(LlmError::AuthFailed {
                    provider: "openai".into(),
                }),
                StatusCode::BAD_GATEWAY,
            ),
            (ApiError::AnnotatorDisabled, StatusCode::SERVICE_UNAVAILABLE),
        ];
        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }

    #[test]
    fn create_request_accepts_description_alias() {
        let parsed: CreateTodoRequest = serde_json::from_str(r#"{"description":"buy milk"}"#).unwrap();
        assert_eq!(parsed.text.as_deref(), Some("buy milk"));

        let parsed: CreateTodoRequest = serde_json::from_str(r#"{"text":"buy milk"}"#).unwrap();
        assert_eq!(parsed.text.as_deref(), Some("buy milk"));

        let parsed: CreateTodoRequest = serde_json::from_str("{}").unwrap();
        assert!(parsed.text.is_none());
    }
}
