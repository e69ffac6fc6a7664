//! # Taskboard API Server
//!
//! HTTP API for the kanban board: cards with nested tasks, task creation and
//! update, and card updates that reconcile the card's task list.
//!
//! ## Startup
//!
//! 1. Load configuration from the environment (and `.env`)
//! 2. Resolve database credentials (URL or secret store)
//! 3. Build the connection pool and apply migrations
//! 4. Serve until SIGINT/SIGTERM, then close the pool
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p taskboard-api
//! ```

use taskboard_api::{
    app::{build_router, AppState},
    config::Config,
    telemetry::init_tracing,
};
use taskboard_shared::db::{
    migrations::run_migrations,
    pool::{close_pool, create_pool},
    secrets::resolve_connect_options,
};
use tokio::{net::TcpListener, signal};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing(config.log.format)?;

    tracing::info!(
        "Taskboard API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let options =
        resolve_connect_options(&config.database.source, config.database.ssl_mode).await?;
    let pool = create_pool(config.database.pool.clone(), options).await?;

    if config.database.run_migrations {
        run_migrations(&pool).await?;
    }

    let bind_address = config.bind_address();
    let app = build_router(AppState::new(pool.clone(), config));

    let listener = TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    close_pool(pool).await;
    tracing::info!("Server shutdown complete");

    Ok(())
}

/// Completes on SIGINT, or SIGTERM on Unix
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::warn!(%error, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::warn!(%error, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        () = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
