//! Chat route: retrieval plus a grounded natural-language answer.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use garage_chat::{generate_answer, AnswerRequest, LlmOptions};
use garage_retrieve::{RetrievalResult, RetrieveQuery, Retriever};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{required_query, ApiResult};
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/chat", post(chat))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChatBody {
    #[serde(default)]
    query: Option<String>,
    #[serde(default)]
    selected_engine: Option<String>,
    #[serde(default)]
    limit: Option<f64>,
    /// Shorthand for `llm.provider`.
    #[serde(default)]
    provider: Option<String>,
    #[serde(default)]
    llm: Option<LlmOptions>,
}

fn summary_counts(retrieval: &RetrievalResult) -> Value {
    json!({
        "chunks": retrieval.top_chunks.len(),
        "parts": retrieval.matched_parts.len(),
        "tools": retrieval.tools.len(),
        "torqueSpecs": retrieval.torque_specs.len(),
        "diagramGrounding": retrieval.diagram_grounding.len(),
        "citations": retrieval.citations.len(),
    })
}

/// POST /chat: retrieve, then answer through the selected provider or the
/// templated fallback. Provider problems surface as warnings, never errors.
async fn chat(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ChatBody>, JsonRejection>,
) -> ApiResult {
    let Json(body) = body?;
    let query = required_query(body.query.as_deref())?;
    let snapshot = state.require_snapshot()?;

    let request = RetrieveQuery::new(query)
        .with_engine(body.selected_engine.as_deref())
        .with_limit(body.limit);
    let retrieval = Retriever::retrieve(&snapshot, &request);

    let mut options = body.llm.unwrap_or_default();
    if options.provider.is_none() {
        options.provider = body.provider;
    }

    let outcome = generate_answer(
        &state.http,
        &state.llm_config,
        &AnswerRequest {
            query,
            engine: request.engine.as_deref(),
            retrieval: &retrieval,
            options: &options,
        },
        state.config.llm_timeout(),
    )
    .await;

    Ok(Json(json!({
        "ok": true,
        "providerUsed": outcome.provider_used,
        "modelUsed": outcome.model_used,
        "retrieval": {"summaryCounts": summary_counts(&retrieval)},
        "response": outcome.answer,
    })))
}
