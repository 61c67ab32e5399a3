//! Retrieval pipeline: analyze, rank, match parts, ground, gather evidence.

use std::collections::HashSet;

use garage_index::RetrieverState;
use tracing::debug;

use crate::evidence::{collect_tools, collect_torque};
use crate::grounding::resolve_groundings;
use crate::parts::{lexical_parts, link_parts, merge_parts};
use crate::query::AnalyzedQuery;
use crate::rank::{citations_for, rank_chunks};
use crate::types::*;

/// Stateless entry point over one snapshot.
pub struct Retriever;

impl Retriever {
    /// Run the full pipeline for one query. Always completes.
    pub fn retrieve(state: &RetrieverState, request: &RetrieveQuery) -> RetrievalResult {
        let query = AnalyzedQuery::analyze(&request.query);
        let engine = request.engine.as_deref();

        let top_chunks = rank_chunks(state, &query, engine, request.limit);
        let citations = citations_for(state, &top_chunks);
        let doc_ids = selected_documents(&top_chunks);

        let matched_parts = merge_parts(
            link_parts(state, &doc_ids),
            lexical_parts(state, &query, engine),
        );
        let diagram_grounding = resolve_groundings(state, &matched_parts);
        let tools = collect_tools(state, &doc_ids);
        let torque_specs = collect_torque(state, &doc_ids);

        let mut warnings = Vec::new();
        if top_chunks.is_empty() {
            warnings.push(WARN_NO_CHUNKS.to_string());
        }
        if matched_parts.is_empty() {
            warnings.push(WARN_NO_PARTS.to_string());
        }

        debug!(
            "Retrieved for {:?} (engine={:?}, intent={}): chunks={}, docs={}, parts={}, groundings={}, tools={}, torque={}",
            request.query,
            engine,
            query.procedure_intent,
            top_chunks.len(),
            doc_ids.len(),
            matched_parts.len(),
            diagram_grounding.len(),
            tools.len(),
            torque_specs.len()
        );

        RetrievalResult {
            top_chunks,
            matched_parts,
            tools,
            torque_specs,
            diagram_grounding,
            citations,
            warnings,
        }
    }
}

/// Distinct document ids in rank order.
fn selected_documents(chunks: &[ScoredChunk]) -> Vec<String> {
    let mut seen = HashSet::new();
    chunks
        .iter()
        .map(|sc| sc.chunk.doc_id.as_str())
        .filter(|doc_id| seen.insert(*doc_id))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::*;
    use std::collections::HashMap;

    fn retrieve(query: &str, engine: Option<&str>, limit: Option<f64>) -> RetrievalResult {
        let state = state(brake_corpus());
        let request = RetrieveQuery::new(query).with_engine(engine).with_limit(limit);
        Retriever::retrieve(&state, &request)
    }

    #[test]
    fn test_full_pipeline() {
        let result = retrieve("replace brake pads", None, Some(5.0));

        assert!(result.top_chunks.len() <= 5);
        assert_eq!(result.top_chunks[0].chunk.doc_id, "d-pads");
        assert_eq!(result.matched_parts[0].match_source, MatchSource::Link);
        assert_eq!(result.diagram_grounding.len(), 1);
        let codes: Vec<&str> = result.tools.iter().map(|t| t.code.as_str()).collect();
        assert_eq!(codes, vec!["KM-6174", "KM-900"]);
        assert_eq!(result.torque_specs.len(), 2);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_invariants_hold() {
        for (query, engine) in [
            ("replace brake pads", None),
            ("brake", Some("Z19DTH")),
            ("brake", Some("Z22YH")),
            ("caliper bolts 13301234", None),
        ] {
            let result = retrieve(query, engine, Some(25.0));

            let mut per_doc: HashMap<&str, usize> = HashMap::new();
            for sc in &result.top_chunks {
                *per_doc.entry(sc.chunk.doc_id.as_str()).or_default() += 1;
                if let Some(e) = engine {
                    assert!(sc.chunk.engines.is_empty() || sc.chunk.lists_engine(e));
                }
            }
            assert!(per_doc.values().all(|&n| n <= MAX_CHUNKS_PER_DOC));

            assert_eq!(result.citations.len(), result.top_chunks.len());
            for (c, sc) in result.citations.iter().zip(&result.top_chunks) {
                assert_eq!(c.chunk_id, sc.chunk.chunk_id);
            }

            let keys: HashSet<String> = result.matched_parts.iter().map(|m| m.part.identity_key()).collect();
            assert_eq!(keys.len(), result.matched_parts.len());
        }
    }

    #[test]
    fn test_warnings_when_nothing_matches() {
        let mut corpus = brake_corpus();
        corpus
            .chunks
            .push(chunk("t1", "d-tsb", "Brake judder bulletin", "Resurface discs.", "tsb", &[]));
        let request = RetrieveQuery::new("windscreen washer");
        let result = Retriever::retrieve(&state(corpus), &request);
        assert_eq!(result.warnings, vec![WARN_NO_CHUNKS.to_string(), WARN_NO_PARTS.to_string()]);
        assert!(result.citations.is_empty());
        assert!(result.tools.is_empty());
    }

    #[test]
    fn test_deterministic_for_fixed_query() {
        let a = retrieve("replace brake pads", None, None);
        let b = retrieve("replace brake pads", None, None);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn test_result_serializes_camel_case() {
        let value = serde_json::to_value(retrieve("replace brake pads", None, None)).unwrap();
        assert!(value["topChunks"].is_array());
        assert!(value["matchedParts"][0]["diagramUrl"].is_string());
        assert_eq!(value["matchedParts"][0]["matchSource"], "link");
        assert_eq!(value["citations"][0]["type"], "doc");
        assert!(value["diagramGrounding"][0]["diagramUrl"].is_string());
        assert!(value["torqueSpecs"].is_array());
    }
}
