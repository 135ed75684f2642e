mod config;
mod documents;
mod errors;
mod llm_client;
mod models;
mod prompts;
mod routes;
mod screening;
mod similarity;
mod state;
mod text;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::{build_backend, EMBEDDING_DIMS};
use crate::prompts::TemplateStore;
use crate::routes::build_router;
use crate::screening::{BlendPolicy, UnweightedAverage};
use crate::similarity::SimilarityIndex;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing API keys for the selected backend)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", "screening_api", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Screening API v{}", env!("CARGO_PKG_VERSION"));

    // Completion backend, selected once
    let backend = build_backend(&config)?;

    // Prompt templates: built-ins, optionally overridden from disk
    let templates = match &config.template_dir {
        Some(dir) => TemplateStore::with_overrides(dir)?,
        None => TemplateStore::builtin(),
    };
    info!("Prompt templates loaded");

    // Similarity index (empty until the first append if nothing is on disk)
    let index = SimilarityIndex::open(&config.index_path, EMBEDDING_DIMS);

    let blend_policy: Arc<dyn BlendPolicy> = Arc::new(UnweightedAverage);
    info!("Score blend policy: {}", blend_policy.name());

    // Build app state
    let state = AppState {
        backend,
        templates: Arc::new(templates),
        index: Arc::new(index),
        blend_policy,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
