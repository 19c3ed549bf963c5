//! HTTP routes:
//!
//! ```text
//! GET  /health  - liveness probe
//! POST /invoke  - analyze one screen and recommend the next action
//! ```

use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tracing::Instrument;

use crate::advisor::{InvokeRequest, Recommendation};
use crate::server::error::ApiError;
use crate::server::AppState;

#[derive(Debug, Serialize)]
pub struct InvokeResponse {
    pub status: &'static str,
    #[serde(rename = "Agent-response")]
    pub agent_response: Recommendation,
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/invoke", post(invoke))
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "healthy" }))
}

async fn invoke(
    State(state): State<Arc<AppState>>,
    Json(request): Json<InvokeRequest>,
) -> Result<Json<InvokeResponse>, ApiError> {
    let request_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("invoke", request_id = %request_id);

    async move {
        tracing::info!(
            has_image = request.image.is_some(),
            has_xml = request.xml.is_some(),
            "invoke received"
        );
        let recommendation = state.advisor.advise(&request).await?;
        Ok::<_, ApiError>(Json(InvokeResponse {
            status: "success",
            agent_response: recommendation,
        }))
    }
    .instrument(span)
    .await
}
