//! Health check endpoints.

use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct PingResponse {
    message: &'static str,
}

/// Liveness probe; also the endpoint the platform's own keep-alive hits
pub async fn ping() -> Json<PingResponse> {
    Json(PingResponse {
        message: "OTP Server is awake",
    })
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Basic health check (is the server running?)
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
