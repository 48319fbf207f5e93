use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::AppError;
use crate::llm_client::Advisor;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SuggestionRequest {
    pub section: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct SuggestionResponse {
    pub suggestions: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    /// Falls back to the live editor document when absent.
    pub resume_data: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    pub analysis: String,
}

fn advisor(state: &AppState) -> Result<Arc<dyn Advisor>, AppError> {
    state.advisor.clone().ok_or(AppError::AdvisorUnavailable)
}

/// POST /api/v1/suggestions
pub async fn handle_suggestions(
    State(state): State<AppState>,
    Json(req): Json<SuggestionRequest>,
) -> Result<Json<SuggestionResponse>, AppError> {
    if req.content.trim().is_empty() {
        return Err(AppError::Validation("content must not be empty".to_string()));
    }
    let suggestions = advisor(&state)?.suggest(&req.section, &req.content).await?;
    Ok(Json(SuggestionResponse { suggestions }))
}

/// POST /api/v1/analysis
pub async fn handle_analysis(
    State(state): State<AppState>,
    Json(req): Json<AnalysisRequest>,
) -> Result<Json<AnalysisResponse>, AppError> {
    let advisor = advisor(&state)?;
    let data = req.resume_data.unwrap_or_else(|| state.editor.current());
    let analysis = advisor.analyze(&data).await?;
    Ok(Json(AnalysisResponse { analysis }))
}
