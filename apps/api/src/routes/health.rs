use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns service status plus the configured model tiers, in fallback order.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let tiers: Vec<Value> = state
        .generator
        .tiers()
        .iter()
        .map(|t| {
            json!({
                "name": t.name,
                "model": t.model,
                "max_retries": t.max_retries,
            })
        })
        .collect();

    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "talentflow",
        "tiers": tiers
    }))
}
