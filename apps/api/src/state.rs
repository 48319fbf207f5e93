use std::sync::Arc;

use crate::config::Config;
use crate::editor::EditorSession;
use crate::llm_client::Advisor;
use crate::store::ResumeStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub store: ResumeStore,
    /// Live editor document; also the store's data sink.
    pub editor: Arc<EditorSession>,
    /// `None` when no API key is configured.
    pub advisor: Option<Arc<dyn Advisor>>,
    pub config: Config,
}
