mod config;
mod dom;
mod errors;
mod fill;
mod llm_client;
mod models;
mod resume;
mod routes;
mod state;
mod taxonomy;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::fill::{FieldMatcher, FormFiller};
use crate::llm_client::LlmClient;
use crate::resume::{LlmResumeParser, StateFile, StateStore};
use crate::routes::build_router;
use crate::state::AppState;
use crate::taxonomy::FieldTaxonomy;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting autofill API v{}", env!("CARGO_PKG_VERSION"));

    // Load persisted resume + settings
    let store = StateStore::open(StateFile::new(&config.resume_state_path)).await?;

    // Initialize fill engine
    let taxonomy = Arc::new(FieldTaxonomy::standard());
    info!("Field taxonomy loaded ({} canonical fields)", taxonomy.fields().len());
    let filler = Arc::new(FormFiller::new(Arc::new(FieldMatcher::standard(taxonomy))));

    // Initialize LLM client
    let llm = LlmClient::new(
        config.dashscope_api_key.clone(),
        config.llm_base_url.clone(),
        config.llm_model.clone(),
    )?;
    if config.dashscope_api_key.is_none() {
        tracing::warn!("DASHSCOPE_API_KEY not set; remote parsing endpoints will fail");
    }
    info!("LLM client initialized (model: {})", llm.model());

    let state = AppState {
        config: config.clone(),
        store: Arc::new(store),
        filler,
        resume_parser: Arc::new(LlmResumeParser(llm)),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
