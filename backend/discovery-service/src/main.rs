use actix_web::{web, App, HttpServer};
use anyhow::Context;
use discovery_service::{handlers, Config, DiscoveryHandlerState, InMemoryCandidateStore};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info,actix_web=info".into()))
        .init();

    // Load config
    let config = Config::from_env().context("Failed to load config")?;

    info!(
        "Starting {} v{} on {}:{}",
        config.service.service_name,
        env!("CARGO_PKG_VERSION"),
        config.service.http_host,
        config.service.http_port
    );
    info!(
        boundaries_km = ?config.ranking.distance_boundaries_km,
        default_radius_km = config.ranking.default_radius_km,
        max_limit = config.ranking.max_limit,
        "Ranking settings loaded"
    );

    let store = InMemoryCandidateStore::new();
    match &config.service.catalog_path {
        Some(path) => {
            store
                .load_json_file(path)
                .await
                .with_context(|| format!("Failed to load catalog from {}", path))?;
        }
        None => warn!("CATALOG_PATH not set - serving an empty catalog"),
    }

    let state = web::Data::new(DiscoveryHandlerState::new(
        Arc::new(store),
        config.ranking.clone(),
    ));

    HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(state.clone())
            .configure(handlers::configure)
    })
    .bind((config.service.http_host.as_str(), config.service.http_port))?
    .run()
    .await?;

    Ok(())
}
