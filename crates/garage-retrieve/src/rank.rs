//! Chunk ranker: heuristic lexical scoring with domain boosts.
//!
//! A full linear scan per request; collections are thousands of chunks, not
//! millions, so no inverted index is kept.

use std::collections::HashMap;

use garage_index::{ContentType, ProcedureChunk, RetrieverState};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::query::AnalyzedQuery;
use crate::types::{Citation, CitationKind, ScoredChunk, MAX_CHUNKS_PER_DOC};

/// Score forced onto chunks the engine filter rules out.
pub const EXCLUDED: f64 = -1.0;

const TITLE_PHRASE: f64 = 12.0;
const BODY_PHRASE: f64 = 8.0;
const TITLE_TOKEN: f64 = 3.0;
const BODY_TOKEN: f64 = 1.0;
const PROCEDURE_BOOST: f64 = 9.0;
const STEPS_BOOST: f64 = 4.0;
const REPAIR_TITLE_BOOST: f64 = 2.0;
const GENERIC_PENALTY: f64 = -1.0;
const TSB_NUDGE: f64 = 0.5;
const DIAGNOSTIC_NUDGE: f64 = -0.5;
const EXPLICIT_ENGINE: f64 = 1.0;

static REPAIR_TITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(remov|install|replac)").expect("static pattern"));

/// Score one chunk. Values `<= 0` mean "not relevant".
pub fn score_chunk(chunk: &ProcedureChunk, query: &AnalyzedQuery, engine: Option<&str>) -> f64 {
    if let Some(engine) = engine {
        if !chunk.applies_to_engine(engine) {
            return EXCLUDED;
        }
    }

    let title = chunk.title.to_lowercase();
    let text = chunk.text.to_lowercase();
    let mut score = 0.0;

    if !query.lowered.is_empty() {
        if title.contains(&query.lowered) {
            score += TITLE_PHRASE;
        }
        if text.contains(&query.lowered) {
            score += BODY_PHRASE;
        }
    }

    for token in &query.tokens {
        if title.contains(token.as_str()) {
            score += TITLE_TOKEN;
        } else if text.contains(token.as_str()) {
            score += BODY_TOKEN;
        }
    }

    // Category and engine signals only reorder chunks the query hit.
    if score <= 0.0 {
        return 0.0;
    }

    let content_type = chunk.content_type.as_ref();

    if query.procedure_intent {
        match content_type {
            Some(ContentType::Procedure) => score += PROCEDURE_BOOST,
            Some(ContentType::Generic) => score += GENERIC_PENALTY,
            _ => {}
        }
        if chunk.is_step_structured() {
            score += STEPS_BOOST;
        }
        if REPAIR_TITLE.is_match(&title) {
            score += REPAIR_TITLE_BOOST;
        }
    }

    match content_type {
        Some(ContentType::Tsb) => score += TSB_NUDGE,
        Some(ContentType::Diagnostic) => score += DIAGNOSTIC_NUDGE,
        _ => {}
    }

    if engine.is_some_and(|e| chunk.lists_engine(e)) {
        score += EXPLICIT_ENGINE;
    }

    score
}

/// Best chunks, at most `MAX_CHUNKS_PER_DOC` per document, up to `limit`.
///
/// Equal scores keep input order.
pub fn rank_chunks(
    state: &RetrieverState,
    query: &AnalyzedQuery,
    engine: Option<&str>,
    limit: usize,
) -> Vec<ScoredChunk> {
    let mut scored: Vec<(usize, f64)> = state
        .chunks
        .iter()
        .enumerate()
        .map(|(idx, chunk)| (idx, score_chunk(chunk, query, engine)))
        .filter(|(_, score)| *score > 0.0)
        .collect();

    // sort_by is stable
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));

    let mut per_doc: HashMap<&str, usize> = HashMap::new();
    let mut accepted = Vec::with_capacity(limit.min(scored.len()));

    for (idx, score) in scored {
        if accepted.len() >= limit {
            break;
        }
        let chunk = &state.chunks[idx];
        let taken = per_doc.entry(chunk.doc_id.as_str()).or_insert(0);
        if *taken >= MAX_CHUNKS_PER_DOC {
            continue;
        }
        *taken += 1;
        accepted.push(ScoredChunk {
            chunk: chunk.clone(),
            score,
        });
    }

    accepted
}

/// One citation per accepted chunk, same order.
pub fn citations_for(state: &RetrieverState, chunks: &[ScoredChunk]) -> Vec<Citation> {
    chunks
        .iter()
        .map(|sc| {
            let title = if sc.chunk.title.trim().is_empty() {
                state
                    .document(&sc.chunk.doc_id)
                    .map(|d| d.title.clone())
                    .unwrap_or_default()
            } else {
                sc.chunk.title.clone()
            };
            Citation {
                kind: CitationKind::Doc,
                doc_id: sc.chunk.doc_id.clone(),
                chunk_id: sc.chunk.chunk_id.clone(),
                title,
                url: format!("/doc/{}", sc.chunk.doc_id),
                score: sc.score,
            }
        })
        .collect()
}
