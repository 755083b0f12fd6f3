//! Liveness and database probe

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::context::AppContext;
use crate::utils::health::HealthReport;

/// `GET /health`
///
/// # Example Response
/// ```json
/// {
///   "status": "ok",
///   "database": { "name": "database", "isHealthy": true, "activeConnections": 0, "maxConnections": 8 }
/// }
/// ```
pub async fn get_health(State(ctx): State<Arc<AppContext>>) -> (StatusCode, Json<HealthReport>) {
    let report = ctx.health_check();
    let status = if report.is_healthy() { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status, Json(report))
}
