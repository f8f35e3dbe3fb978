//! Yield prediction API server
//!
//! Loads the embedding table and model once, then serves cell geometry,
//! seasonal weather and ranked yield predictions over HTTP.

use std::net::SocketAddr;
use std::sync::Arc;

use agro_config::AppConfig;
use agro_ingest::OpenMeteoSettings;
use agro_scoring::{EmbeddingTable, LinearModel, YieldScorer};
use anyhow::{Context, Result};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<()> {
    // Observability
    agro_obs::init("agro-server");

    // Config
    let cfg = match AppConfig::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::warn!(error = %e, "config unreadable, using defaults");
            AppConfig::default()
        }
    };

    // Weather provider
    let settings = OpenMeteoSettings {
        archive_url: cfg.archive_url(),
        timezone: cfg.timezone(),
        models: cfg.models(),
        timeout: cfg.upstream_timeout(),
    };
    let source = agro_ingest::build_source(&cfg.weather_source(), settings)
        .context("Failed to create weather source")?;
    tracing::info!(source = source.name(), "Weather source ready");

    // Static scoring state, shared read-only by every request
    let table = EmbeddingTable::load(cfg.embeddings_path())
        .with_context(|| format!("Failed to load {}", cfg.embeddings_path().display()))?;
    let model = LinearModel::load(cfg.weights_path())
        .with_context(|| format!("Failed to load {}", cfg.weights_path().display()))?;
    let scorer = YieldScorer::new(Arc::new(table), Arc::new(model));
    tracing::info!(
        samples = scorer.table().len(),
        dimension = scorer.table().dimension(),
        "Scorer ready"
    );

    let (app, state) = agro_server::build_app(agro_server::Services {
        source,
        scorer,
        season_start: cfg.season_start(),
        season_end: cfg.season_end(),
    })?;

    // Start HTTP server
    let addr: SocketAddr = cfg
        .http_bind()
        .parse()
        .context("Invalid HTTP bind address")?;
    let listener = TcpListener::bind(addr)
        .await
        .context("failed to bind TCP listener")?;

    // Mark ready just before serving
    agro_server::set_ready(&state, true);

    tracing::info!(%addr, "HTTP server listening");
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
