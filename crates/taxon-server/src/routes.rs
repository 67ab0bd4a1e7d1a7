//! HTTP routes and handlers

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Instant;
use taxon_classifiers::{Strategy, SuggestionOutcome};
use taxon_core::{CategoryNode, LeafCategory, SuggestionRequest};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, Instrument};

use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let body_limit = state.config.max_body_bytes;

    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .route("/v1/categories/suggest", post(suggest))
        .route("/v1/categories/leaves", post(leaves))
        .fallback(fallback)
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

async fn metrics(State(state): State<AppState>) -> String {
    state.metrics_handle.render()
}

/// Suggestion request body
#[derive(Debug, Serialize, Deserialize)]
pub struct SuggestBody {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub categories: Vec<CategoryNode>,
    #[serde(default)]
    pub strategy: Strategy,
}

/// Leaf listing request body
#[derive(Debug, Serialize, Deserialize)]
pub struct LeavesBody {
    pub categories: Vec<CategoryNode>,
}

/// Leaf listing response
#[derive(Debug, Serialize, Deserialize)]
pub struct LeavesResponse {
    pub leaves: Vec<LeafCategory>,
}

/// Rank leaf categories for a service request
async fn suggest(
    State(state): State<AppState>,
    Json(body): Json<SuggestBody>,
) -> Result<Json<SuggestionOutcome>, AppError> {
    let request_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("suggest", %request_id);

    async move {
        if body.title.trim().is_empty() && body.description.trim().is_empty() {
            return Err(AppError::InvalidRequest(
                "title or description must be non-empty".to_string(),
            ));
        }

        debug!(
            "Suggesting over {} categories with strategy {:?}",
            body.categories.len(),
            body.strategy
        );

        let start = Instant::now();
        let request = SuggestionRequest::new(body.title, body.description);
        let outcome = state
            .engine
            .suggest_with(&request, &body.categories, body.strategy)
            .await;

        metrics::histogram!("taxon_suggest_latency_us")
            .record(start.elapsed().as_micros() as f64);
        info!(
            "Returned {} suggestions from {:?} in {}ms",
            outcome.suggestions.len(),
            outcome.source,
            start.elapsed().as_millis()
        );

        Ok(Json(outcome))
    }
    .instrument(span)
    .await
}

/// List leaf categories with their paths
async fn leaves(
    State(state): State<AppState>,
    Json(body): Json<LeavesBody>,
) -> Json<LeavesResponse> {
    Json(LeavesResponse {
        leaves: state.engine.leaves(&body.categories),
    })
}

async fn fallback() -> AppError {
    AppError::NotFound
}

/// Error handling
#[derive(Debug)]
pub enum AppError {
    InvalidRequest(String),
    NotFound,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, kind) = match self {
            AppError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, msg, "invalid_request_error")
            }
            AppError::NotFound => (StatusCode::NOT_FOUND, "Not found".to_string(), "not_found"),
        };

        let body = json!({
            "error": {
                "message": message,
                "type": kind,
            }
        });

        (status, Json(body)).into_response()
    }
}
