mod config;
mod errors;
mod routes;
mod scoring;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::routes::build_router;
use crate::scoring::{EngineConfig, GuideCatalog, HeuristicScorer, ScoringEngine};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed numeric env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Remarq API v{}", env!("CARGO_PKG_VERSION"));

    // Guide catalog: built-in domains, then GUIDES_DIR overrides
    let mut guides = GuideCatalog::builtin().context("Built-in guide catalog is invalid")?;
    if let Some(dir) = &config.guides_dir {
        guides = guides.load_dir(dir)?;
    }
    info!("Guide catalog loaded ({} domains)", guides.len());

    // Initialize scorer (HeuristicScorer by default; other backends implement ReportScorer)
    let engine = ScoringEngine::new(EngineConfig {
        max_text_chars: config.max_text_chars,
    });
    let scorer = Arc::new(HeuristicScorer::new(engine));
    info!(
        "Scoring engine ready (max_text_chars: {}, max_upload_bytes: {})",
        config.max_text_chars, config.max_upload_bytes
    );

    // Build app state
    let state = AppState {
        config: config.clone(),
        scorer,
        guides: Arc::new(guides),
    };

    // Build router
    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()), // TODO: restrict origins to the portal front-end
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
