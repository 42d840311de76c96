//! # Health Endpoint
//!
//! Minimal liveness surface for process supervision. Scheduling
//! correctness never depends on it; if the bind fails the bot keeps
//! running without it.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.1.0
//! - **Toggleable**: true

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use log::info;

/// Shared state for the health server.
#[derive(Clone)]
pub struct HealthState {
    pub start_time: Instant,
}

async fn healthz(State(state): State<Arc<HealthState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": crate::features::get_bot_version(),
        "uptime_seconds": state.start_time.elapsed().as_secs(),
    }))
}

/// Serve `GET /healthz` on `addr` until the process exits.
pub async fn serve(addr: String, state: HealthState) -> Result<()> {
    let app = Router::new()
        .route("/healthz", get(healthz))
        .with_state(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Health endpoint listening on {addr}");
    axum::serve(listener, app).await?;
    Ok(())
}
