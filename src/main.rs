//! gazette server entry point.
//!
//! Connects to PostgreSQL, applies migrations, seeds the founder and starts
//! the Axum HTTP server.

use anyhow::Context;
use axum::Router;
use axum::http::StatusCode;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use gazette::api;
use gazette::app_state::AppState;
use gazette::config::GazetteConfig;
use gazette::persistence::Database;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = GazetteConfig::from_env().context("invalid LISTEN_ADDR")?;
    init_tracing(config.log_json);
    tracing::info!(addr = %config.listen_addr, "starting gazette");

    let database = Database::connect(&config)
        .await
        .context("connecting to PostgreSQL")?;
    if config.run_migrations {
        database.migrate().await.context("applying migrations")?;
        tracing::info!("migrations applied");
    }

    let state = AppState::new(database, config.recent_events_limit);

    if let Some(seed) = config.founder_seed() {
        let seeded = state
            .admins
            .seed_founder(seed)
            .await
            .context("seeding founder")?;
        if !seeded {
            tracing::debug!("admins present, founder seed skipped");
        }
    }

    let app = Router::new()
        .merge(api::build_router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(TimeoutLayer::with_status_code(
                    StatusCode::REQUEST_TIMEOUT,
                    config.request_timeout(),
                )),
        )
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("binding {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
    tracing::info!("shutting down");
}
