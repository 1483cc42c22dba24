mod config;
mod db;
mod errors;
mod generation;
mod llm_client;
mod models;
mod quality;
mod registry;
mod routes;
mod scoring;
mod state;
mod store;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::generation::gateway::LlmQuestionGenerator;
use crate::generation::limiter::GenerationLimiter;
use crate::llm_client::LlmClient;
use crate::quality::rules::QualityRules;
use crate::quality::QualityPipeline;
use crate::registry::Registry;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::PgAssessmentStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting assessment API v{}", env!("CARGO_PKG_VERSION"));

    // PostgreSQL + migrations
    let db = create_pool(&config.database_url).await?;
    let store = Arc::new(PgAssessmentStore::new(db));

    // Generator: LLM client behind the shared limiter
    let llm = LlmClient::new(config.anthropic_api_key.clone())?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);
    let limiter = GenerationLimiter::new(
        config.generation.concurrency,
        config.generation.min_interval,
        config.generation.queue_wait,
    );
    let generator = Arc::new(LlmQuestionGenerator::new(
        Arc::new(llm),
        limiter,
        config.generation.timeout,
    ));
    info!(
        "Generation limiter: concurrency={}, min interval={}ms, timeout={}s",
        config.generation.concurrency,
        config.generation.min_interval.as_millis(),
        config.generation.timeout.as_secs()
    );

    let pipeline = Arc::new(QualityPipeline::new(QualityRules::standard()?));

    let registry = Arc::new(Registry::new(
        store.clone(),
        generator,
        pipeline,
        config.assessment,
    ));

    let state = AppState { store, registry };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins to the hiring and candidate frontends

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
