//! Liveness plus database reachability

use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};
use sqlx::PgPool;
use std::sync::Arc;

/// Health check endpoint handler
///
/// Answers 503 when the ledger database cannot be reached.
pub async fn health(State(pool): State<Arc<PgPool>>) -> (StatusCode, Json<Value>) {
    let (status, state, database) = match sqlx::query("SELECT 1").execute(pool.as_ref()).await {
        Ok(_) => (StatusCode::OK, "healthy", "up"),
        Err(err) => {
            tracing::warn!(error = %err, "Health check could not reach the database");
            (StatusCode::SERVICE_UNAVAILABLE, "unhealthy", "down")
        }
    };

    (
        status,
        Json(json!({
            "status": state,
            "database": database,
            "service": "retail-inventory-rs",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}
