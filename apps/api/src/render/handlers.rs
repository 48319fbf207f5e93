use axum::{
    extract::{Path, State},
    Json,
};

use crate::errors::AppError;
use crate::render::{render_preview, PreviewDocument};
use crate::state::AppState;

/// GET /api/v1/resumes/:id/preview
pub async fn handle_resume_preview(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PreviewDocument>, AppError> {
    let resume = state
        .store
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))?;
    Ok(Json(render_preview(&resume.data)))
}

/// GET /api/v1/session/preview
/// Renders the live document, including edits not yet saved.
pub async fn handle_session_preview(State(state): State<AppState>) -> Json<PreviewDocument> {
    Json(render_preview(&state.editor.current()))
}
