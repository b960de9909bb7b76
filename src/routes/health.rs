use axum::Json;
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Service status, always "healthy" when the process is serving
    pub status: String,
    /// Current server time in ISO 8601 / RFC 3339 format
    pub timestamp: String,
    /// Service name
    pub service: String,
    /// API version
    pub version: String,
}

/// Health check endpoint.
///
/// Always returns 200 while the process is up. The UI uses this to decide
/// between live and demo/offline presentation, so it must stay dependency-free:
/// no oracle invocation, no upstream calls.
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now().to_rfc3339(),
        service: "Traffic Prediction API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
