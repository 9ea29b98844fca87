//! Health check endpoint
//!
//! Reports the list load state and how much of the detail cache is warm.
//! Answers 200 even when the list index failed to load, so a monitor can tell
//! "process up, data unreachable" apart from "process down".

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::{AppState, Catalog};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ListState {
    Ready,
    Failed,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub module: String,
    pub version: String,
    pub list: ListState,
    /// Entities in the list index (0 when it failed)
    pub entities: usize,
    /// Detail documents settled so far, successes plus failures
    pub details_settled: usize,
    pub details_failed: usize,
    /// Failure message of the list load
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HealthResponse {
    fn new(list: ListState) -> Self {
        Self {
            status: "ok".to_string(),
            module: "parl-viewer".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            list,
            entities: 0,
            details_settled: 0,
            details_failed: 0,
            error: None,
        }
    }
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let response = match state.catalog.as_ref() {
        Catalog::Ready(session) => {
            let (cached, failed) = session.store().settled_counts();
            HealthResponse {
                entities: session.roster().len(),
                details_settled: cached + failed,
                details_failed: failed,
                ..HealthResponse::new(ListState::Ready)
            }
        }
        Catalog::Failed(failure) => HealthResponse {
            error: Some(failure.message.clone()),
            ..HealthResponse::new(ListState::Failed)
        },
    };
    Json(response)
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
