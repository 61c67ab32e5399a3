//! Records decoded from the index artifacts.

use serde::{Deserialize, Serialize};

use crate::de;
use crate::normalize::normalize_part_no;

/// Extra fields carried through verbatim.
pub type Extra = serde_json::Map<String, serde_json::Value>;

/// Kind of text a chunk was cut from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ContentType {
    /// Removal/installation/repair instructions.
    Procedure,
    /// Technical service bulletin.
    Tsb,
    /// Diagnostic trouble-code or test plan.
    Diagnostic,
    /// Catch-all reference text.
    Generic,
    /// Anything else the transform pipeline emits, kept verbatim.
    Other(String),
}

impl From<String> for ContentType {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "procedure" => Self::Procedure,
            "tsb" => Self::Tsb,
            "diagnostic" => Self::Diagnostic,
            "generic" => Self::Generic,
            _ => Self::Other(value),
        }
    }
}

impl From<ContentType> for String {
    fn from(value: ContentType) -> Self {
        match value {
            ContentType::Procedure => "procedure".into(),
            ContentType::Tsb => "tsb".into(),
            ContentType::Diagnostic => "diagnostic".into(),
            ContentType::Generic => "generic".into(),
            ContentType::Other(s) => s,
        }
    }
}

/// Per-chunk metadata written by the chunker.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_type: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// A unit of procedure text; many per document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcedureChunk {
    #[serde(deserialize_with = "de::string")]
    pub chunk_id: String,
    #[serde(deserialize_with = "de::string")]
    pub doc_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<ContentType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<ChunkMeta>,
    /// Engine codes this chunk applies to; empty means every engine.
    #[serde(default, deserialize_with = "de::string_list")]
    pub engines: Vec<String>,
}

impl ProcedureChunk {
    /// Whether the chunker marked this chunk as numbered/step content.
    pub fn is_step_structured(&self) -> bool {
        self.meta
            .as_ref()
            .and_then(|m| m.chunk_type.as_deref())
            .map(|t| t.to_ascii_lowercase().contains("step"))
            .unwrap_or(false)
    }

    /// Whether an engine filter lets this chunk through.
    pub fn applies_to_engine(&self, engine: &str) -> bool {
        self.engines.is_empty() || self.lists_engine(engine)
    }

    /// Whether the engine is named explicitly (not just implied by an empty set).
    pub fn lists_engine(&self, engine: &str) -> bool {
        self.engines.iter().any(|e| e == engine)
    }
}

/// Document metadata; chunks refer to it by `doc_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(deserialize_with = "de::string")]
    pub doc_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(flatten)]
    pub extra: Extra,
}

/// A parts catalogue entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartRecord {
    #[serde(default, deserialize_with = "de::string")]
    pub part_no: String,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub part_no_normalized: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub kat_no: Option<String>,
    #[serde(default)]
    pub description: String,
    /// Free-text applicability, usually naming engine codes.
    #[serde(default, deserialize_with = "de::opt_string")]
    pub usage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qty: Option<serde_json::Value>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub diagram_id: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub group_id: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string", skip_serializing_if = "Option::is_none")]
    pub group_name: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string", skip_serializing_if = "Option::is_none")]
    pub section_name: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string", skip_serializing_if = "Option::is_none")]
    pub assembly_name: Option<String>,
    #[serde(rename = "ref", default, deserialize_with = "de::opt_string")]
    pub reference: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub diagram_url: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl PartRecord {
    /// Join key: the upstream normalized number, or one derived from `part_no`.
    pub fn normalized_part_no(&self) -> String {
        match self.part_no_normalized.as_deref().map(str::trim) {
            Some(n) if !n.is_empty() => normalize_part_no(n),
            _ => normalize_part_no(&self.part_no),
        }
    }

    pub fn normalized_ref(&self) -> String {
        self.reference.as_deref().map(normalize_part_no).unwrap_or_default()
    }

    /// Identity used to deduplicate parts across sources.
    pub fn identity_key(&self) -> String {
        format!(
            "{}|{}|{}",
            self.normalized_part_no(),
            self.diagram_id.as_deref().unwrap_or("").trim(),
            self.normalized_ref()
        )
    }
}

/// Pre-computed association between a document and catalogue parts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartProcedureLink {
    #[serde(deserialize_with = "de::string")]
    pub doc_id: String,
    #[serde(default)]
    pub doc_title: String,
    #[serde(default)]
    pub epc_matches: Vec<PartRecord>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundingDiagram {
    #[serde(default, deserialize_with = "de::opt_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub sheet_code: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotspotInfo {
    #[serde(default)]
    pub has_hotspot: bool,
    #[serde(default)]
    pub best_confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(default)]
    pub geometry_count: u32,
}

/// One candidate visual location of a part on an assembly diagram.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramGrounding {
    #[serde(default, deserialize_with = "de::string")]
    pub part_no: String,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub part_no_normalized: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub usage: Option<String>,
    #[serde(rename = "ref", default, deserialize_with = "de::opt_string")]
    pub reference: Option<String>,
    #[serde(default)]
    pub diagram: GroundingDiagram,
    #[serde(default)]
    pub hotspot: HotspotInfo,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub group_id: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub group_name: Option<String>,
}

impl DiagramGrounding {
    /// Ranking key: a confirmed hotspot outweighs any confidence value.
    pub fn rank_score(&self) -> f64 {
        let anchor = if self.hotspot.has_hotspot { 100.0 } else { 0.0 };
        anchor + self.hotspot.best_confidence
    }
}

/// A special service tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    #[serde(deserialize_with = "de::string")]
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "de::string_list")]
    pub used_in: Vec<String>,
}

/// A tightening value quoted on a document page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TorqueValue {
    #[serde(default)]
    pub component: String,
    #[serde(default, deserialize_with = "de::string")]
    pub value: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default, deserialize_with = "de::string")]
    pub source_page: String,
}
