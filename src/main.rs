//! foxvote-gateway server entry point.
//!
//! Starts the Axum HTTP server with REST and WebSocket endpoints,
//! restores the registry from the latest snapshots, and spawns the
//! event-log and snapshot background tasks.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use foxvote_gateway::api;
use foxvote_gateway::app_state::AppState;
use foxvote_gateway::config::GatewayConfig;
use foxvote_gateway::domain::{EntityRegistry, EventBus};
use foxvote_gateway::persistence;
use foxvote_gateway::persistence::postgres::PostgresPersistence;
use foxvote_gateway::service::VotingService;
use foxvote_gateway::upstream::HttpSeedClient;
use foxvote_gateway::ws::handler::ws_handler;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = GatewayConfig::from_env()?;
    tracing::info!(addr = %config.listen_addr, "starting foxvote-gateway");

    // Build domain layer
    let registry = Arc::new(EntityRegistry::new());
    let event_bus = EventBus::new(config.event_bus_capacity);

    // Build upstream seed client
    let seed = Arc::new(HttpSeedClient::new(
        config.fox_api_url.clone(),
        config.joke_api_url.clone(),
        config.upstream_timeout(),
    )?);

    // Wire persistence: restore state, then spawn the event-log and
    // snapshot tasks. Failures here degrade durability, not serving.
    if config.persistence_enabled {
        let pg_pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .acquire_timeout(std::time::Duration::from_secs(
                config.database_connect_timeout_secs,
            ))
            .connect(&config.database_url)
            .await?;
        sqlx::migrate!().run(&pg_pool).await?;

        let store = PostgresPersistence::new(pg_pool);
        persistence::restore_registry(&store, &registry).await?;

        tokio::spawn(persistence::run_event_log(
            store.clone(),
            event_bus.subscribe(),
        ));
        tokio::spawn(persistence::run_snapshot_loop(
            store,
            Arc::clone(&registry),
            std::time::Duration::from_secs(config.snapshot_interval_secs),
            config.cleanup_after_days,
        ));
    } else {
        tracing::warn!("persistence disabled; state is in-memory only");
    }

    // Build service layer
    let voting_service = Arc::new(VotingService::new(registry, event_bus.clone(), seed));

    // Build application state
    let app_state = AppState {
        voting_service,
        event_bus,
    };

    // Build router
    let app = Router::new()
        .merge(api::build_router())
        .route("/ws", get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
