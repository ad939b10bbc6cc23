use axum::{Json, extract::State, http::StatusCode};
use serde_json::{Value, json};
use tracing::warn;

use crate::infra::app_state::AppState;

/// GET /api/health
pub async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let mut health_status = json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "storage": state.storage_kind(),
        "checks": {}
    });

    let mut is_unhealthy = false;

    if let Some(db) = &state.postgres {
        match db.ping().await {
            Ok(()) => {
                health_status["checks"]["database"] = json!({ "status": "healthy" });
            }
            Err(e) => {
                warn!("database health check failed: {e}");
                health_status["checks"]["database"] = json!({
                    "status": "unhealthy",
                    "error": e.to_string()
                });
                is_unhealthy = true;
            }
        }
    }

    health_status["checks"]["city_filters"] = json!({
        "status": "healthy",
        "destinations": state.city_filters.destinations().len()
    });

    if is_unhealthy {
        health_status["status"] = json!("unhealthy");
        (StatusCode::SERVICE_UNAVAILABLE, Json(health_status))
    } else {
        (StatusCode::OK, Json(health_status))
    }
}
