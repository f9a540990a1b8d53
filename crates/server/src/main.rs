//! Smartmess server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, middleware};
use smartmess_api::{AppState, auth_middleware, router as api_router};
use smartmess_common::Config;
use smartmess_core::{AutoLoopService, StaffCleanupService, UserDeletionService};
use smartmess_scheduler::{CoreExecutor, SchedulerConfig, run_scheduler};
use smartmess_store::{DocumentStore, HttpDocumentStore, HttpIdentityStore, IdentityStore};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "smartmess=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting smartmess server...");

    // Load configuration
    let config = Config::load()?;

    // Construct the external store clients once and inject them everywhere
    let documents: Arc<dyn DocumentStore> = Arc::new(HttpDocumentStore::new(
        &config.documents.base_url,
        &config.documents.database,
    ));
    let identity: Arc<dyn IdentityStore> = Arc::new(HttpIdentityStore::new(
        &config.identity.base_url,
        &config.identity.api_key,
    ));
    info!("Connected store clients");

    // Initialize services
    let user_deletion_service = UserDeletionService::new(documents.clone(), identity.clone());
    let staff_cleanup_service = StaffCleanupService::new(documents.clone(), identity.clone());
    let auto_loop_service =
        AutoLoopService::new(documents.clone(), config.auto_loop.schedule_tz()?);

    // Create app state
    let state = AppState {
        user_deletion_service,
        staff_cleanup_service,
        identity,
    };

    // Build router
    let app = Router::new()
        .nest("/api", api_router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start the nightly auto-loop scheduler
    let scheduler_config = SchedulerConfig::from_auto_loop(&config.auto_loop)?;
    info!(
        hour = scheduler_config.hour,
        minute = scheduler_config.minute,
        timezone = %scheduler_config.tz,
        "Starting auto-loop scheduler..."
    );
    run_scheduler(scheduler_config, Arc::new(CoreExecutor::new(auto_loop_service)));

    // Start server with graceful shutdown
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
