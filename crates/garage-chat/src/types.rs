//! Chat types matching the viewer's API surface.

use garage_index::de;
use serde::{Deserialize, Serialize};

/// LLM provider identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LLMProvider {
    OpenAI,
    Anthropic,
    Groq,
}

impl LLMProvider {
    /// Parse a provider name; `None` for names this service cannot call.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "openai" => Some(Self::OpenAI),
            "anthropic" | "claude" => Some(Self::Anthropic),
            "groq" => Some(Self::Groq),
            _ => None,
        }
    }
}

impl std::fmt::Display for LLMProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LLMProvider::OpenAI => write!(f, "openai"),
            LLMProvider::Anthropic => write!(f, "anthropic"),
            LLMProvider::Groq => write!(f, "groq"),
        }
    }
}

/// Per-request provider selection (`llm` object of the chat body).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmOptions {
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerPart {
    #[serde(default, deserialize_with = "de::string")]
    pub part_no: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qty: Option<serde_json::Value>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub diagram_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerTool {
    #[serde(default, deserialize_with = "de::string")]
    pub code: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerTorque {
    #[serde(default)]
    pub component: String,
    #[serde(default, deserialize_with = "de::string")]
    pub value: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub source_page: Option<String>,
}

/// Structured answer, from the model or from the fallback template.
///
/// Grounding and citations stay loosely typed: they are overwritten from
/// retrieval whenever the model leaves them empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatAnswer {
    pub answer: String,
    #[serde(default)]
    pub procedure_summary: Vec<String>,
    #[serde(default)]
    pub required_parts: Vec<AnswerPart>,
    #[serde(default)]
    pub required_tools: Vec<AnswerTool>,
    #[serde(default)]
    pub torque_specs: Vec<AnswerTorque>,
    #[serde(default)]
    pub diagram_grounding: Vec<serde_json::Value>,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default)]
    pub citations: Vec<serde_json::Value>,
}
