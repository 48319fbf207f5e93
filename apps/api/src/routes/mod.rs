pub mod health;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::llm_client::handlers as advisor;
use crate::render::handlers as preview;
use crate::state::AppState;
use crate::store::handlers;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Resume collection
        .route(
            "/api/v1/resumes",
            get(handlers::handle_list_resumes).post(handlers::handle_create_resume),
        )
        .route(
            "/api/v1/resumes/:id",
            get(handlers::handle_get_resume)
                .patch(handlers::handle_rename_resume)
                .delete(handlers::handle_delete_resume),
        )
        .route("/api/v1/resumes/:id/load", post(handlers::handle_load_resume))
        .route(
            "/api/v1/resumes/:id/duplicate",
            post(handlers::handle_duplicate_resume),
        )
        .route("/api/v1/resumes/:id/data", put(handlers::handle_save_resume))
        .route(
            "/api/v1/resumes/:id/preview",
            get(preview::handle_resume_preview),
        )
        // Editor session
        .route("/api/v1/session", get(handlers::handle_get_session))
        .route(
            "/api/v1/session/data",
            put(handlers::handle_replace_live_data).patch(handlers::handle_update_live_field),
        )
        .route("/api/v1/session/save", post(handlers::handle_save_session))
        .route(
            "/api/v1/session/ensure-active",
            post(handlers::handle_ensure_active),
        )
        .route("/api/v1/session/preview", get(preview::handle_session_preview))
        // Writing aids
        .route("/api/v1/suggestions", post(advisor::handle_suggestions))
        .route("/api/v1/analysis", post(advisor::handle_analysis))
        .with_state(state)
}
