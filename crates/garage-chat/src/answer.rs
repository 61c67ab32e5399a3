//! Answer assembly: provider call, templated fallback, evidence backfill.

use std::time::Duration;

use garage_retrieve::RetrievalResult;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::config::{LLMConfig, Resolution};
use crate::providers::{complete, Completion, ProviderError};
use crate::types::{AnswerPart, AnswerTool, AnswerTorque, ChatAnswer, LLMProvider, LlmOptions};

/// Entries per list in the fallback answer.
const FALLBACK_ITEMS: usize = 3;
/// Entries per list forwarded to the model.
const BUNDLE_ITEMS: usize = 8;
const BUNDLE_TEXT_CHARS: usize = 900;
const SUMMARY_TEXT_CHARS: usize = 240;

pub const WARN_NO_PROVIDER: &str = "No LLM provider selected; answer generated from retrieved evidence.";

const SYSTEM_PROMPT: &str = "You are a workshop assistant for vehicle service technicians. \
Answer ONLY from the JSON evidence bundle supplied by the user. Never invent part numbers, \
tool codes, or torque values; if the evidence does not cover something, say so in warnings. \
Reply with a single JSON object and nothing else, using exactly these keys: \
\"answer\" (string, required), \"procedureSummary\" (array of strings), \
\"requiredParts\" (array of {\"partNo\",\"description\",\"qty\",\"diagramUrl\"}), \
\"requiredTools\" (array of {\"code\",\"name\"}), \
\"torqueSpecs\" (array of {\"component\",\"value\",\"unit\",\"sourcePage\"}), \
\"diagramGrounding\" (array, copy entries from the bundle), \
\"warnings\" (array of strings), \
\"citations\" (array, copy entries from the bundle).";

/// Inputs for one chat answer.
#[derive(Debug, Clone, Copy)]
pub struct AnswerRequest<'a> {
    pub query: &'a str,
    pub engine: Option<&'a str>,
    pub retrieval: &'a RetrievalResult,
    pub options: &'a LlmOptions,
}

/// Final answer plus which provider produced it, if any.
#[derive(Debug, Clone)]
pub struct AnswerOutcome {
    pub provider_used: Option<LLMProvider>,
    pub model_used: Option<String>,
    pub answer: ChatAnswer,
}

/// Produce an answer for the request. Never fails: every provider problem
/// degrades to the templated answer plus a warning.
pub async fn generate_answer(
    client: &Client,
    config: &LLMConfig,
    request: &AnswerRequest<'_>,
    timeout: Duration,
) -> AnswerOutcome {
    let mut provider_used = None;
    let mut model_used = None;

    let (model_answer, note) = match config.resolve(request.options) {
        Resolution::NoProvider => (None, Some(WARN_NO_PROVIDER.to_string())),
        Resolution::Unsupported(name) => (
            None,
            Some(format!(
                "Unsupported LLM provider '{}'; answer generated from retrieved evidence.",
                name
            )),
        ),
        Resolution::MissingKey(provider) => (
            None,
            Some(format!(
                "No API key supplied for provider '{}'; answer generated from retrieved evidence.",
                provider
            )),
        ),
        Resolution::Ready {
            provider,
            model,
            api_key,
        } => {
            let bundle = compact_bundle(request).to_string();
            let completion = Completion {
                provider,
                url: config.url_for(provider),
                model: &model,
                api_key: &api_key,
                system: SYSTEM_PROMPT,
                user: &bundle,
            };
            match ask_provider(client, &completion, timeout).await {
                Ok(answer) => {
                    info!("Answer generated by {} ({})", provider, model);
                    provider_used = Some(provider);
                    model_used = Some(model);
                    (Some(answer), None)
                }
                Err(e) => {
                    warn!("LLM provider {} failed: {}", provider, e);
                    (
                        None,
                        Some(format!(
                            "LLM provider '{}' failed ({}); answer generated from retrieved evidence.",
                            provider, e
                        )),
                    )
                }
            }
        }
    };

    let mut answer = model_answer.unwrap_or_else(|| fallback_answer(request.query, request.retrieval));
    if let Some(note) = note {
        answer.warnings.push(note);
    }
    backfill(&mut answer, request.retrieval);

    AnswerOutcome {
        provider_used,
        model_used,
        answer,
    }
}

async fn ask_provider(
    client: &Client,
    completion: &Completion<'_>,
    timeout: Duration,
) -> Result<ChatAnswer, ProviderError> {
    let text = tokio::time::timeout(timeout, complete(client, completion))
        .await
        .map_err(|_| ProviderError::Timeout(timeout.as_secs()))??;
    parse_model_answer(&text).ok_or(ProviderError::Malformed)
}

/// Decode the model's reply, tolerating code fences or prose around the
/// object. A missing or blank `answer` counts as malformed.
pub fn parse_model_answer(text: &str) -> Option<ChatAnswer> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str::<ChatAnswer>(&text[start..=end])
        .ok()
        .filter(|a| !a.answer.trim().is_empty())
}

/// Restore evidence the model dropped. Citations, grounding, and warnings
/// always come from retrieval when the payload leaves them empty.
pub fn backfill(answer: &mut ChatAnswer, retrieval: &RetrievalResult) {
    if answer.citations.is_empty() {
        answer.citations = to_values(&retrieval.citations);
    }
    if answer.diagram_grounding.is_empty() {
        answer.diagram_grounding = to_values(&retrieval.diagram_grounding);
    }
    if answer.warnings.is_empty() {
        answer.warnings = retrieval.warnings.clone();
    }
}

fn to_values<T: serde::Serialize>(items: &[T]) -> Vec<Value> {
    items
        .iter()
        .filter_map(|item| serde_json::to_value(item).ok())
        .collect()
}

fn first<T>(items: &[T], n: usize) -> &[T] {
    &items[..items.len().min(n)]
}

fn excerpt(text: &str, max_chars: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max_chars {
        collapsed
    } else {
        let cut: String = collapsed.chars().take(max_chars).collect();
        format!("{}...", cut.trim_end())
    }
}

/// Templated answer built only from retrieval output.
pub fn fallback_answer(query: &str, retrieval: &RetrievalResult) -> ChatAnswer {
    let procedure_summary: Vec<String> = retrieval
        .top_chunks
        .iter()
        .zip(&retrieval.citations)
        .take(FALLBACK_ITEMS)
        .map(|(sc, cite)| format!("{}: {}", cite.title, excerpt(&sc.chunk.text, SUMMARY_TEXT_CHARS)))
        .collect();

    let required_parts: Vec<AnswerPart> = retrieval
        .matched_parts
        .iter()
        .take(FALLBACK_ITEMS)
        .map(|m| AnswerPart {
            part_no: m.part.part_no.clone(),
            description: m.part.description.clone(),
            qty: m.part.qty.clone(),
            diagram_url: m.part.diagram_url.clone(),
        })
        .collect();

    let required_tools: Vec<AnswerTool> = retrieval
        .tools
        .iter()
        .take(FALLBACK_ITEMS)
        .map(|t| AnswerTool {
            code: t.code.clone(),
            name: t.name.clone(),
        })
        .collect();

    let torque_specs: Vec<AnswerTorque> = retrieval
        .torque_specs
        .iter()
        .take(FALLBACK_ITEMS)
        .map(|t| AnswerTorque {
            component: t.component.clone(),
            value: t.value.clone(),
            unit: t.unit.clone(),
            source_page: Some(t.source_page.clone()),
        })
        .collect();

    let mut lines = Vec::new();
    match retrieval.citations.first() {
        Some(best) => lines.push(format!(
            "Best matching procedure for \"{}\": {} ({}).",
            query.trim(),
            best.title,
            best.url
        )),
        None => lines.push(format!(
            "No service procedure matched \"{}\". Try naming the component or a part number.",
            query.trim()
        )),
    }
    if !required_parts.is_empty() {
        let parts: Vec<String> = required_parts
            .iter()
            .map(|p| format!("{} {}", p.part_no, p.description).trim().to_string())
            .collect();
        lines.push(format!("Parts: {}.", parts.join("; ")));
    }
    if !required_tools.is_empty() {
        let tools: Vec<String> = required_tools
            .iter()
            .map(|t| format!("{} {}", t.code, t.name).trim().to_string())
            .collect();
        lines.push(format!("Special tools: {}.", tools.join("; ")));
    }
    if !torque_specs.is_empty() {
        let specs: Vec<String> = torque_specs
            .iter()
            .map(|t| format!("{} {} {}", t.component, t.value, t.unit).trim().to_string())
            .collect();
        lines.push(format!("Torque: {}.", specs.join("; ")));
    }
    let diagrams: Vec<String> = retrieval
        .diagram_grounding
        .iter()
        .take(FALLBACK_ITEMS)
        .filter_map(|g| g.diagram_url.as_ref().map(|url| format!("{} at {}", g.grounding.part_no, url)))
        .collect();
    if !diagrams.is_empty() {
        lines.push(format!("Diagrams: {}.", diagrams.join("; ")));
    }

    ChatAnswer {
        answer: lines.join("\n"),
        procedure_summary,
        required_parts,
        required_tools,
        torque_specs,
        diagram_grounding: to_values(first(&retrieval.diagram_grounding, FALLBACK_ITEMS)),
        warnings: retrieval.warnings.clone(),
        citations: Vec::new(),
    }
}

/// Trimmed retrieval bundle forwarded to the model.
pub fn compact_bundle(request: &AnswerRequest<'_>) -> Value {
    let r = request.retrieval;
    let chunks: Vec<Value> = r
        .top_chunks
        .iter()
        .take(BUNDLE_ITEMS)
        .map(|sc| {
            json!({
                "docId": sc.chunk.doc_id,
                "chunkId": sc.chunk.chunk_id,
                "title": sc.chunk.title,
                "contentType": sc.chunk.content_type,
                "score": sc.score,
                "text": excerpt(&sc.chunk.text, BUNDLE_TEXT_CHARS),
            })
        })
        .collect();
    let parts: Vec<Value> = r
        .matched_parts
        .iter()
        .take(BUNDLE_ITEMS)
        .map(|m| {
            json!({
                "partNo": m.part.part_no,
                "description": m.part.description,
                "qty": m.part.qty,
                "usage": m.part.usage,
                "ref": m.part.reference,
                "diagramUrl": m.part.diagram_url,
            })
        })
        .collect();
    let grounding: Vec<Value> = r
        .diagram_grounding
        .iter()
        .take(BUNDLE_ITEMS)
        .map(|g| {
            json!({
                "partNo": g.grounding.part_no,
                "diagramId": g.grounding.diagram.id,
                "hasHotspot": g.grounding.hotspot.has_hotspot,
                "diagramUrl": g.diagram_url,
            })
        })
        .collect();

    json!({
        "query": request.query,
        "engine": request.engine,
        "chunks": chunks,
        "parts": parts,
        "tools": to_values(first(&r.tools, BUNDLE_ITEMS)),
        "torqueSpecs": to_values(first(&r.torque_specs, BUNDLE_ITEMS)),
        "diagramGrounding": grounding,
        "citations": to_values(first(&r.citations, BUNDLE_ITEMS)),
        "warnings": r.warnings,
    })
}
