//! Health check endpoint handlers.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::app::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub upstream: UpstreamHealth,
}

/// Reachability of the Supabase REST endpoint.
#[derive(Debug, Serialize)]
pub struct UpstreamHealth {
    pub reachable: bool,
    pub latency_ms: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
}

/// Full health check.
///
/// GET /api/health
///
/// 200 when the REST endpoint answers, 503 otherwise. The body is returned
/// in both cases.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let start = std::time::Instant::now();
    let result = state.db.ping().await;
    let latency_ms = start.elapsed().as_millis() as u64;

    let reachable = match result {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Upstream health check failed");
            false
        }
    };

    let response = HealthResponse {
        status: if reachable { "healthy" } else { "unhealthy" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        upstream: UpstreamHealth {
            reachable,
            latency_ms: reachable.then_some(latency_ms),
        },
    };

    let status = if reachable {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(response))
}

/// Liveness check.
///
/// GET /api/health/live
pub async fn live() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "alive".to_string(),
    })
}
