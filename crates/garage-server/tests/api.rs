//! HTTP contract tests: drive the router directly (no socket) and check
//! the response shapes the viewer depends on.

use std::path::Path;
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use garage_chat::LLMConfig;
use garage_core::GarageConfig;
use garage_server::{build_router, AppState};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

fn write_indexes(dir: &Path) {
    let files = [
        (
            "procedure-chunks.json",
            json!({"chunks": [
                {
                    "chunkId": "p1",
                    "docId": "d-pads",
                    "title": "Brake Pads – Remove and Install",
                    "text": "Remove the caliper bolts, then lift out the brake pads.",
                    "contentType": "procedure"
                },
                {
                    "chunkId": "g1",
                    "docId": "d-overview",
                    "title": "Brake pads overview",
                    "text": "The brake pads wear against the disc.",
                    "contentType": "generic"
                },
                {
                    "chunkId": "z1",
                    "docId": "d-diesel",
                    "title": "Brake vacuum pump",
                    "text": "Vacuum pump on the diesel engine.",
                    "contentType": "procedure",
                    "engines": ["Z19DTH"]
                }
            ]}),
        ),
        (
            "documents.json",
            json!({"documents": [{"docId": "d-pads", "title": "Front brakes"}]}),
        ),
        (
            "parts-index.json",
            json!({"items": [
                {"partNo": "93176375", "partNoNormalized": "93176375", "description": "Brake pad set, front", "diagramId": "D10", "groupId": "G1", "ref": 1},
                {"partNo": "13301234", "partNoNormalized": "13301234", "description": "Caliper bolt", "diagramId": "D10", "groupId": "G1", "ref": "2"}
            ]}),
        ),
        (
            "part-procedure-links.json",
            json!({"links": [{
                "docId": "d-pads",
                "docTitle": "Front brakes",
                "epcMatches": [{"partNo": "93176375", "description": "Brake pad set, front", "diagramId": "D10", "groupId": "G1", "ref": "1"}]
            }]}),
        ),
        (
            "diagram-grounding.json",
            json!({"groundings": [
                {"partNo": "93176375", "partNoNormalized": "93176375", "diagram": {"id": "D10"}, "hotspot": {"hasHotspot": true, "bestConfidence": 0.8}, "groupId": "G1"}
            ]}),
        ),
        (
            "tools.json",
            json!({"tools": [{"code": "KM-6174", "name": "Piston compressor", "usedIn": ["d-pads"]}]}),
        ),
        (
            "torque-values.json",
            json!([{"component": "Caliper bolt", "value": 28, "unit": "Nm", "sourcePage": "d-pads"}]),
        ),
    ];
    for (name, value) in files {
        std::fs::write(dir.join(name), value.to_string()).unwrap();
    }
}

fn app_state(dir: &Path) -> Arc<AppState> {
    Arc::new(AppState::new(
        GarageConfig::with_index_dir(dir),
        LLMConfig::default(),
    ))
}

/// A router over a loaded snapshot; the `TempDir` must outlive it.
async fn loaded_app() -> (Router, TempDir) {
    let dir = TempDir::new().unwrap();
    write_indexes(dir.path());
    let state = app_state(dir.path());
    state.reload().await.unwrap();
    (build_router(state), dir)
}

fn unloaded_app() -> Router {
    build_router(app_state(Path::new("/nonexistent/garage-indexes")))
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    call(app, "POST", uri, Some(&body.to_string())).await
}

#[tokio::test]
async fn test_health_before_load() {
    let (status, body) = call(&unloaded_app(), "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    assert_eq!(body["loaded"], false);
    assert_eq!(body["counts"]["chunks"], 0);
    assert!(body["loadedAt"].is_null());
}

#[tokio::test]
async fn test_health_reports_counts() {
    let (app, _dir) = loaded_app().await;
    let (status, body) = call(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["loaded"], true);
    assert_eq!(
        body["counts"],
        json!({
            "chunks": 3,
            "documents": 1,
            "parts": 2,
            "links": 1,
            "diagramGrounding": 1,
            "tools": 1,
            "torqueValues": 1
        })
    );
    assert!(body["loadedAt"].is_number());
}

#[tokio::test]
async fn test_reload_is_idempotent() {
    let dir = TempDir::new().unwrap();
    write_indexes(dir.path());
    let app = build_router(app_state(dir.path()));

    let (status, first) = post(&app, "/reload-indexes", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["ok"], true);
    let (_, second) = post(&app, "/reload-indexes", json!({})).await;
    assert_eq!(first["counts"], second["counts"]);

    let (_, health) = call(&app, "GET", "/health", None).await;
    assert_eq!(health["loaded"], true);
}

#[tokio::test]
async fn test_reload_failure_is_reported() {
    let (status, body) = post(&unloaded_app(), "/reload-indexes", json!({})).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["ok"], false);
    assert!(body["error"].as_str().unwrap().contains("does not exist"));
}

#[tokio::test]
async fn test_retrieve_requires_query() {
    let (app, _dir) = loaded_app().await;
    for body in [json!({"query": "   "}), json!({})] {
        let (status, body) = post(&app, "/retrieve", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"ok": false, "error": "query is required"}));
    }
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let (app, _dir) = loaded_app().await;
    let (status, body) = call(&app, "POST", "/retrieve", Some("{not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["ok"], false);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_retrieve_not_ready() {
    let (status, body) = post(&unloaded_app(), "/retrieve", json!({"query": "brake pads"})).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["ok"], false);
    assert!(body["error"].as_str().unwrap().contains("not loaded"));
}

#[tokio::test]
async fn test_retrieve_bundle_shape() {
    let (app, _dir) = loaded_app().await;
    let (status, body) = post(&app, "/retrieve", json!({"query": "replace brake pads", "limit": 100})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);

    let retrieval = &body["retrieval"];
    let chunks = retrieval["topChunks"].as_array().unwrap();
    assert!(!chunks.is_empty() && chunks.len() <= 25);
    assert_eq!(chunks[0]["chunkId"], "p1");
    assert_eq!(retrieval["citations"].as_array().unwrap().len(), chunks.len());
    assert_eq!(retrieval["citations"][0]["type"], "doc");
    assert_eq!(retrieval["citations"][0]["url"], "/doc/d-pads");
    assert_eq!(retrieval["matchedParts"][0]["partNo"], "93176375");
    assert_eq!(retrieval["matchedParts"][0]["diagramUrl"], "/epc/G1/diagram/D10");
    assert_eq!(retrieval["diagramGrounding"][0]["diagramUrl"], "/epc/G1/diagram/D10");
    assert_eq!(retrieval["tools"][0]["code"], "KM-6174");
    assert_eq!(retrieval["torqueSpecs"][0]["value"], "28");
    assert_eq!(retrieval["warnings"], json!([]));
}

#[tokio::test]
async fn test_retrieve_engine_filter() {
    let (app, _dir) = loaded_app().await;
    let (_, body) = post(&app, "/retrieve", json!({"query": "brake", "selectedEngine": "Z22YH"})).await;
    let ids: Vec<&str> = body["retrieval"]["topChunks"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|c| c["chunkId"].as_str())
        .collect();
    assert!(!ids.contains(&"z1"));
    assert!(ids.contains(&"p1"));
}

#[tokio::test]
async fn test_locate_part() {
    let (app, _dir) = loaded_app().await;

    let (status, body) = post(&app, "/locate-part", json!({"ref": "1"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "partNo or diagramId is required");

    let (status, body) = post(&app, "/locate-part", json!({"diagramId": "D10"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    assert_eq!(body["matches"][0]["diagramRoute"], "/epc/G1/diagram/D10");

    let (_, body) = post(&app, "/locate-part", json!({"partNo": " (1330 1234) "})).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["matches"][0]["description"], "Caliper bolt");
}

#[tokio::test]
async fn test_chat_without_provider_uses_fallback() {
    let (app, _dir) = loaded_app().await;
    let (status, body) = post(&app, "/chat", json!({"query": "replace brake pads"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    assert!(body["providerUsed"].is_null());
    assert!(body["modelUsed"].is_null());

    let counts = &body["retrieval"]["summaryCounts"];
    assert!(counts["chunks"].as_u64().unwrap() > 0);
    assert_eq!(counts["citations"], counts["chunks"]);
    assert_eq!(counts["torqueSpecs"], 1);

    let response = &body["response"];
    assert!(response["answer"].as_str().unwrap().contains("Brake Pads"));
    assert_eq!(
        response["warnings"],
        json!(["No LLM provider selected; answer generated from retrieved evidence."])
    );
    assert!(!response["citations"].as_array().unwrap().is_empty());
    assert!(!response["diagramGrounding"].as_array().unwrap().is_empty());
    assert!(response["procedureSummary"].is_array());
    assert!(response["requiredParts"].is_array());
    assert!(response["requiredTools"].is_array());
    assert!(response["torqueSpecs"].is_array());
}

#[tokio::test]
async fn test_chat_missing_key_is_not_a_failure() {
    let (app, _dir) = loaded_app().await;
    let (status, body) = post(
        &app,
        "/chat",
        json!({"query": "replace brake pads", "llm": {"provider": "openai", "model": "gpt-4o-mini"}}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    assert!(body["providerUsed"].is_null());
    let warnings = body["response"]["warnings"].as_array().unwrap();
    assert!(warnings
        .iter()
        .any(|w| w.as_str().unwrap_or_default().contains("API key")));
}

#[tokio::test]
async fn test_chat_top_level_provider_shorthand() {
    let (app, _dir) = loaded_app().await;
    let (status, body) = post(&app, "/chat", json!({"query": "brake pads", "provider": "groq"})).await;
    assert_eq!(status, StatusCode::OK);
    let warnings = body["response"]["warnings"].as_array().unwrap();
    assert!(warnings
        .iter()
        .any(|w| w.as_str().unwrap_or_default().contains("'groq'")));
}

#[tokio::test]
async fn test_chat_validation_and_readiness() {
    let (app, _dir) = loaded_app().await;
    let (status, body) = post(&app, "/chat", json!({"query": ""})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "query is required");

    let (status, _) = post(&unloaded_app(), "/chat", json!({"query": "brake"})).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}
