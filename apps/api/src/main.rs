mod config;
mod editor;
mod errors;
mod llm_client;
mod models;
mod render;
mod routes;
mod state;
mod storage;
mod store;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, StorageBackend};
use crate::editor::EditorSession;
use crate::llm_client::{Advisor, LlmClient};
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::{FileStore, KvResumeRepository, MemoryStore, ResumeRepository};
use crate::store::{DataSink, ResumeStore};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume API v{}", env!("CARGO_PKG_VERSION"));

    let repository = open_repository(&config)?;

    // The editor session receives every resume the store loads.
    let editor = Arc::new(EditorSession::new());
    let sink: Arc<dyn DataSink> = editor.clone();
    let store = ResumeStore::new(repository, Some(sink), config.store_timings());

    match store.bootstrap()? {
        Some(id) => info!("Active resume: {id}"),
        None => info!("No stored resumes yet"),
    }

    let advisor: Option<Arc<dyn Advisor>> = match &config.anthropic_api_key {
        Some(key) => {
            info!("Writing assistant enabled (model: {})", llm_client::MODEL);
            let client: Arc<dyn Advisor> = Arc::new(LlmClient::new(key.clone())?);
            Some(client)
        }
        None => {
            warn!("ANTHROPIC_API_KEY not set, writing assistant disabled");
            None
        }
    };

    let state = AppState {
        store: store.clone(),
        editor,
        advisor,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the editor is served from a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Commit an edit still waiting in the debounce window.
    store.flush()?;
    info!("Shut down cleanly");

    Ok(())
}

fn open_repository(config: &Config) -> Result<Arc<dyn ResumeRepository>> {
    Ok(match config.storage_backend {
        StorageBackend::File => Arc::new(KvResumeRepository::new(FileStore::open(
            &config.storage_dir,
        )?)),
        StorageBackend::Memory => {
            warn!("Using in-memory storage, resumes will not survive a restart");
            Arc::new(KvResumeRepository::new(MemoryStore::new()))
        }
    })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
