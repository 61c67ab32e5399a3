//! Retrieval request and result types.

use garage_index::{DiagramGrounding, PartRecord, ProcedureChunk, Tool, TorqueValue};
use serde::Serialize;

pub const DEFAULT_LIMIT: usize = 10;
pub const MAX_LIMIT: usize = 25;
pub const MAX_CHUNKS_PER_DOC: usize = 3;
pub const MAX_LEXICAL_PARTS: usize = 10;
pub const MAX_MATCHED_PARTS: usize = 12;
pub const MAX_GROUNDINGS: usize = 12;
pub const MAX_TOOLS: usize = 12;
pub const MAX_TORQUE_SPECS: usize = 20;

pub const WARN_NO_CHUNKS: &str = "No procedure chunks matched the query.";
pub const WARN_NO_PARTS: &str = "No parts were identified for the query.";

/// Clamp a caller-supplied limit into `[1, MAX_LIMIT]`.
pub fn clamp_limit(limit: Option<f64>) -> usize {
    match limit {
        Some(l) if l.is_finite() => (l.floor().max(1.0) as usize).min(MAX_LIMIT),
        _ => DEFAULT_LIMIT,
    }
}

/// One retrieval request.
#[derive(Debug, Clone)]
pub struct RetrieveQuery {
    pub query: String,
    /// Engine code to scope content and parts to.
    pub engine: Option<String>,
    pub limit: usize,
}

impl RetrieveQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            engine: None,
            limit: DEFAULT_LIMIT,
        }
    }

    /// Blank engine strings mean "no filter".
    pub fn with_engine(mut self, engine: Option<&str>) -> Self {
        self.engine = engine
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(str::to_string);
        self
    }

    pub fn with_limit(mut self, limit: Option<f64>) -> Self {
        self.limit = clamp_limit(limit);
        self
    }
}

/// A chunk accepted by the ranker.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredChunk {
    #[serde(flatten)]
    pub chunk: ProcedureChunk,
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CitationKind {
    Doc,
}

/// Reference back to the chunk that backs an answer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Citation {
    #[serde(rename = "type")]
    pub kind: CitationKind,
    pub doc_id: String,
    pub chunk_id: String,
    pub title: String,
    pub url: String,
    pub score: f64,
}

/// Which pass contributed a merged part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchSource {
    /// Pre-joined to a selected document upstream.
    Link,
    /// Scored against the query text.
    Lexical,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchedPart {
    #[serde(flatten)]
    pub part: PartRecord,
    pub match_source: MatchSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

/// The single diagram location chosen for a matched part.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundingMatch {
    #[serde(flatten)]
    pub grounding: DiagramGrounding,
    pub diagram_url: Option<String>,
}

/// Everything retrieved for one query. Ephemeral.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrievalResult {
    pub top_chunks: Vec<ScoredChunk>,
    pub matched_parts: Vec<MatchedPart>,
    pub tools: Vec<Tool>,
    pub torque_specs: Vec<TorqueValue>,
    pub diagram_grounding: Vec<GroundingMatch>,
    pub citations: Vec<Citation>,
    pub warnings: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_limit() {
        assert_eq!(clamp_limit(None), DEFAULT_LIMIT);
        assert_eq!(clamp_limit(Some(0.0)), 1);
        assert_eq!(clamp_limit(Some(-4.0)), 1);
        assert_eq!(clamp_limit(Some(7.9)), 7);
        assert_eq!(clamp_limit(Some(500.0)), MAX_LIMIT);
        assert_eq!(clamp_limit(Some(f64::NAN)), DEFAULT_LIMIT);
    }

    #[test]
    fn test_blank_engine_is_no_filter() {
        let q = RetrieveQuery::new("x").with_engine(Some("  "));
        assert!(q.engine.is_none());
        let q = RetrieveQuery::new("x").with_engine(Some(" Z19DTH "));
        assert_eq!(q.engine.as_deref(), Some("Z19DTH"));
    }
}
