/// Health check endpoint
///
/// Provides a simple health check endpoint that verifies:
/// - The server is running
/// - Database connectivity
///
/// # Endpoint
///
/// ```text
/// GET /health
/// ```
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "database": "connected",
///   "schema_version": 20250101000000,
///   "pool": { "active_connections": 0, "idle_connections": 1, "total_connections": 1 }
/// }
/// ```
use crate::app::AppState;
use axum::{extract::State, Json};
use serde::Serialize;
use taskboard_shared::db::{
    migrations::get_migration_status,
    pool::{get_pool_stats, health_check as db_health_check, PoolStats},
};

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: &'static str,

    /// Application version
    pub version: &'static str,

    /// Database status
    pub database: &'static str,

    /// Latest applied migration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<i64>,

    /// Connection pool usage
    pub pool: PoolStats,
}

/// Health check handler
///
/// Always answers 200; a failing database shows up as `degraded`.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let connected = match db_health_check(&state.db).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Database health check failed");
            false
        }
    };

    let schema_version = if connected {
        get_migration_status(&state.db)
            .await
            .ok()
            .and_then(|status| status.latest_version)
    } else {
        None
    };

    Json(HealthResponse {
        status: if connected { "healthy" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        database: if connected { "connected" } else { "disconnected" },
        schema_version,
        pool: get_pool_stats(&state.db),
    })
}
