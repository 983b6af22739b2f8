//! HTTP routes.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{Method, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use reel_core::orchestrator::{SessionQueue, SubmitError};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};

pub const HEALTH_MESSAGE: &str = "Video Creator API is running!";

#[derive(Clone)]
pub struct AppState {
    pub queue: Arc<SessionQueue>,
}

#[derive(Debug, Deserialize)]
pub struct CreateVideoRequest {
    #[serde(default)]
    pub topic: Option<String>,
}

type ApiResponse = (StatusCode, Json<Value>);

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/api/create_video", post(create_video))
        .layer(cors())
        .with_state(state)
}

/// Browser front ends on any origin may call the API.
fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any)
}

async fn health() -> &'static str {
    HEALTH_MESSAGE
}

async fn create_video(
    State(state): State<AppState>,
    payload: Result<Json<CreateVideoRequest>, JsonRejection>,
) -> ApiResponse {
    let topic = match payload {
        Ok(Json(request)) => validate_topic(request.topic),
        Err(rejection) => Err(format!("Invalid request body: {}", rejection.body_text())),
    };
    let topic = match topic {
        Ok(topic) => topic,
        Err(message) => return error(StatusCode::BAD_REQUEST, message),
    };

    match state.queue.try_submit(topic.clone()) {
        Ok(session_id) => {
            tracing::info!(session = session_id.as_str(), "Accepted topic '{}'", topic);
            (
                StatusCode::OK,
                Json(json!({
                    "message": format!(
                        "Video creation for '{}' has started. The download link will appear in the server log.",
                        topic
                    ),
                    "session_id": session_id.as_str(),
                })),
            )
        }
        Err(e @ SubmitError::QueueFull { .. }) => {
            tracing::warn!("Rejected topic '{}': {}", topic, e);
            error(StatusCode::SERVICE_UNAVAILABLE, "Too many videos in progress, try again later")
        }
        Err(e @ SubmitError::Closed) => {
            tracing::warn!("Rejected topic '{}': {}", topic, e);
            error(StatusCode::SERVICE_UNAVAILABLE, "Server is shutting down")
        }
    }
}

/// A topic must be present and contain non-whitespace text.
pub fn validate_topic(topic: Option<String>) -> Result<String, String> {
    match topic.map(|t| t.trim().to_string()) {
        Some(t) if !t.is_empty() => Ok(t),
        _ => Err("Please provide a topic".to_string()),
    }
}

fn error(status: StatusCode, message: impl Into<String>) -> ApiResponse {
    (status, Json(json!({ "error": message.into() })))
}
