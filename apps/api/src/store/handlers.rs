use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::models::resume::{Resume, ResumeSummary, SaveStatus};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CreateResumeRequest {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RenameRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct FieldUpdate {
    pub field: String,
    pub value: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdResponse {
    pub id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub active_resume_id: Option<String>,
    pub save_status: SaveStatus,
    pub data: Value,
}

fn session_view(state: &AppState) -> SessionView {
    SessionView {
        active_resume_id: state.store.active_id(),
        save_status: state.store.save_status(),
        data: state.editor.current(),
    }
}

// ── Collection ──────────────────────────────────────────────────────────────

/// GET /api/v1/resumes
pub async fn handle_list_resumes(State(state): State<AppState>) -> Json<Vec<ResumeSummary>> {
    Json(state.store.summaries())
}

/// POST /api/v1/resumes
pub async fn handle_create_resume(
    State(state): State<AppState>,
    body: Option<Json<CreateResumeRequest>>,
) -> Result<(StatusCode, Json<IdResponse>), AppError> {
    let req = body.map(|Json(req)| req).unwrap_or_default();
    let id = state.store.create(req.name.as_deref())?;
    Ok((StatusCode::CREATED, Json(IdResponse { id })))
}

/// GET /api/v1/resumes/:id
pub async fn handle_get_resume(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Resume>, AppError> {
    state
        .store
        .get(&id)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))
}

/// PATCH /api/v1/resumes/:id
pub async fn handle_rename_resume(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<RenameRequest>,
) -> Result<StatusCode, AppError> {
    state.store.rename(&id, &req.name)?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/resumes/:id
pub async fn handle_delete_resume(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.store.delete(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/resumes/:id/load
pub async fn handle_load_resume(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, AppError> {
    state.store.load(&id)?;
    Ok(Json(session_view(&state)))
}

/// POST /api/v1/resumes/:id/duplicate
pub async fn handle_duplicate_resume(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    Ok(match state.store.duplicate(&id)? {
        Some(copy_id) => (StatusCode::CREATED, Json(IdResponse { id: copy_id })).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    })
}

/// PUT /api/v1/resumes/:id/data
pub async fn handle_save_resume(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(data): Json<Value>,
) -> Result<StatusCode, AppError> {
    state.store.save(data, Some(&id))?;
    Ok(StatusCode::NO_CONTENT)
}

// ── Session ─────────────────────────────────────────────────────────────────

/// GET /api/v1/session
pub async fn handle_get_session(State(state): State<AppState>) -> Json<SessionView> {
    Json(session_view(&state))
}

/// PUT /api/v1/session/data
/// Replaces the live document and schedules an auto-save.
pub async fn handle_replace_live_data(
    State(state): State<AppState>,
    Json(data): Json<Value>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let id = state.store.ensure_active()?;
    state.editor.replace(data);
    state.store.auto_save(state.editor.current());
    Ok((StatusCode::ACCEPTED, Json(json!({ "activeResumeId": id }))))
}

/// PATCH /api/v1/session/data
/// Sets one top-level field of the live document and schedules an auto-save.
pub async fn handle_update_live_field(
    State(state): State<AppState>,
    Json(update): Json<FieldUpdate>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let field = update.field.trim();
    if field.is_empty() {
        return Err(AppError::Validation("field must not be empty".to_string()));
    }
    let id = state.store.ensure_active()?;
    let data = state.editor.update_field(field, update.value);
    state.store.auto_save(data);
    Ok((StatusCode::ACCEPTED, Json(json!({ "activeResumeId": id }))))
}

/// POST /api/v1/session/save
pub async fn handle_save_session(State(state): State<AppState>) -> Result<Json<SessionView>, AppError> {
    state.store.flush()?;
    state.store.save(state.editor.current(), None)?;
    Ok(Json(session_view(&state)))
}

/// POST /api/v1/session/ensure-active
pub async fn handle_ensure_active(
    State(state): State<AppState>,
) -> Result<Json<IdResponse>, AppError> {
    let id = state.store.ensure_active()?;
    Ok(Json(IdResponse { id }))
}
