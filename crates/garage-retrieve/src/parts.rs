//! Part matcher and merger.
//!
//! Two sources feed the merged list: parts pre-linked upstream to the
//! selected documents, then parts scored lexically against the query.
//! First occurrence of an identity wins.

use std::collections::HashSet;

use garage_index::{diagram_route, PartRecord, RetrieverState};

use crate::query::AnalyzedQuery;
use crate::types::{MatchSource, MatchedPart, MAX_LEXICAL_PARTS, MAX_MATCHED_PARTS};

const EXACT_NUMBER: f64 = 25.0;
const TOKEN_HIT: f64 = 2.0;

/// Parts linked to any of `doc_ids`, in link order.
pub fn link_parts<'a>(state: &'a RetrieverState, doc_ids: &[String]) -> Vec<&'a PartRecord> {
    let wanted: HashSet<&str> = doc_ids.iter().map(String::as_str).collect();
    state
        .links
        .iter()
        .filter(|link| wanted.contains(link.doc_id.as_str()))
        .flat_map(|link| link.epc_matches.iter())
        .collect()
}

/// Whether a part's free-text usage admits the engine.
///
/// Usage strings are unstructured, so this is a case-insensitive substring
/// test rather than set membership.
pub fn usage_admits_engine(part: &PartRecord, engine: &str) -> bool {
    let engine = engine.to_lowercase();
    part.usage
        .as_deref()
        .map(|u| u.to_lowercase().contains(&engine))
        .unwrap_or(false)
}

fn search_text(part: &PartRecord) -> String {
    [
        Some(part.description.as_str()),
        part.group_name.as_deref(),
        part.section_name.as_deref(),
        part.assembly_name.as_deref(),
        Some(part.part_no.as_str()),
        part.kat_no.as_deref(),
        part.usage.as_deref(),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(" ")
    .to_lowercase()
}

/// Lexical score of one catalogue part; `None` if the engine rules it out.
pub fn score_part(part: &PartRecord, query: &AnalyzedQuery, engine: Option<&str>) -> Option<f64> {
    if let Some(engine) = engine {
        if !usage_admits_engine(part, engine) {
            return None;
        }
    }

    let mut score = 0.0;
    let normalized = part.normalized_part_no();
    if !normalized.is_empty() && query.part_numbers.iter().any(|n| *n == normalized) {
        score += EXACT_NUMBER;
    }

    let haystack = search_text(part);
    let hits = query
        .tokens
        .iter()
        .filter(|t| haystack.contains(t.as_str()))
        .count();
    score += TOKEN_HIT * hits as f64;

    Some(score)
}

/// Top catalogue parts by lexical score, ties in catalogue order.
pub fn lexical_parts<'a>(
    state: &'a RetrieverState,
    query: &AnalyzedQuery,
    engine: Option<&str>,
) -> Vec<(&'a PartRecord, f64)> {
    let mut scored: Vec<(&PartRecord, f64)> = state
        .parts
        .iter()
        .filter_map(|part| score_part(part, query, engine).map(|s| (part, s)))
        .filter(|(_, score)| *score > 0.0)
        .collect();
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    scored.truncate(MAX_LEXICAL_PARTS);
    scored
}

/// Link-derived parts first, then lexical ones, deduplicated by identity.
///
/// Every output gets its diagram URL rebuilt from its own ids.
pub fn merge_parts(linked: Vec<&PartRecord>, lexical: Vec<(&PartRecord, f64)>) -> Vec<MatchedPart> {
    let candidates = linked
        .into_iter()
        .map(|p| (p, MatchSource::Link, None))
        .chain(
            lexical
                .into_iter()
                .map(|(p, s)| (p, MatchSource::Lexical, Some(s))),
        );

    let mut seen = HashSet::new();
    let mut merged = Vec::new();

    for (part, match_source, score) in candidates {
        if merged.len() >= MAX_MATCHED_PARTS {
            break;
        }
        if !seen.insert(part.identity_key()) {
            continue;
        }
        let mut part = part.clone();
        part.diagram_url = diagram_route(part.group_id.as_deref(), part.diagram_id.as_deref());
        merged.push(MatchedPart {
            part,
            match_source,
            score,
        });
    }

    merged
}
