//! Retrieval and part locator routes.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use garage_retrieve::{locate_parts, LocateQuery, RetrieveQuery, Retriever};
use serde::Deserialize;
use serde_json::json;

use super::{required_query, ApiResult};
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/retrieve", post(retrieve))
        .route("/locate-part", post(locate_part))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RetrieveBody {
    #[serde(default)]
    query: Option<String>,
    #[serde(default)]
    selected_engine: Option<String>,
    #[serde(default)]
    limit: Option<f64>,
}

/// POST /retrieve: the raw retrieval bundle for a query.
async fn retrieve(
    State(state): State<Arc<AppState>>,
    body: Result<Json<RetrieveBody>, JsonRejection>,
) -> ApiResult {
    let Json(body) = body?;
    let query = required_query(body.query.as_deref())?;
    let snapshot = state.require_snapshot()?;

    let request = RetrieveQuery::new(query)
        .with_engine(body.selected_engine.as_deref())
        .with_limit(body.limit);
    let retrieval = Retriever::retrieve(&snapshot, &request);

    Ok(Json(json!({"ok": true, "retrieval": retrieval})))
}

/// POST /locate-part: catalogue entries by number, diagram, or reference.
async fn locate_part(
    State(state): State<Arc<AppState>>,
    body: Result<Json<LocateQuery>, JsonRejection>,
) -> ApiResult {
    let Json(query) = body?;
    let snapshot = state.require_snapshot()?;
    let matches = locate_parts(&snapshot, &query)?;

    Ok(Json(json!({
        "ok": true,
        "count": matches.len(),
        "matches": matches,
    })))
}
