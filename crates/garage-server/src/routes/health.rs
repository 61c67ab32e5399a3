//! Health and snapshot reload routes.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;

use super::ApiResult;
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health))
        .route("/reload-indexes", post(reload_indexes))
}

/// GET /health: whether a snapshot is loaded, and its collection sizes.
async fn health(State(state): State<Arc<AppState>>) -> ApiResult {
    let snapshot = state.snapshot();
    Ok(Json(json!({
        "ok": true,
        "loaded": snapshot.is_some(),
        "counts": snapshot.as_ref().map(|s| s.counts()).unwrap_or_default(),
        "loadedAt": snapshot.as_ref().map(|s| s.loaded_at),
    })))
}

/// POST /reload-indexes: rebuild the snapshot from disk.
async fn reload_indexes(State(state): State<Arc<AppState>>) -> ApiResult {
    let counts = state.reload().await?;
    Ok(Json(json!({"ok": true, "counts": counts})))
}
