//! External LLM provider calls.
//!
//! One non-streaming completion per request. OpenAI and Groq share the chat
//! completions format; Anthropic uses the Messages API.

use reqwest::Client;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;

use crate::types::LLMProvider;

const ANTHROPIC_VERSION: &str = "2023-06-01";

const TEMPERATURE: f64 = 0.1;
const MAX_TOKENS: usize = 1400;

/// Why a provider call produced no usable text.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("timed out after {0}s")]
    Timeout(u64),

    #[error("API error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("response had no text content")]
    EmptyContent,

    #[error("response was not a valid answer object")]
    Malformed,
}

/// A single completion: system instruction plus one user message.
#[derive(Debug, Clone)]
pub struct Completion<'a> {
    pub provider: LLMProvider,
    /// Full endpoint URL for the provider's completion API.
    pub url: &'a str,
    pub model: &'a str,
    pub api_key: &'a str,
    pub system: &'a str,
    pub user: &'a str,
}

/// Send the completion to its provider and return the raw response text.
pub async fn complete(client: &Client, request: &Completion<'_>) -> Result<String, ProviderError> {
    match request.provider {
        LLMProvider::OpenAI | LLMProvider::Groq => complete_openai_compat(client, request).await,
        LLMProvider::Anthropic => complete_anthropic(client, request).await,
    }
}

async fn complete_openai_compat(client: &Client, request: &Completion<'_>) -> Result<String, ProviderError> {
    let body = json!({
        "model": request.model,
        "messages": [
            {"role": "system", "content": request.system},
            {"role": "user", "content": request.user},
        ],
        "temperature": TEMPERATURE,
        "max_tokens": MAX_TOKENS,
        "response_format": {"type": "json_object"},
    });

    debug!("Requesting completion from {} with model {}", request.url, request.model);

    let response = client
        .post(request.url)
        .header("Authorization", format!("Bearer {}", request.api_key))
        .json(&body)
        .send()
        .await?;
    let parsed = read_json(response).await?;

    parsed["choices"][0]["message"]["content"]
        .as_str()
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
        .ok_or(ProviderError::EmptyContent)
}

async fn complete_anthropic(client: &Client, request: &Completion<'_>) -> Result<String, ProviderError> {
    let body = json!({
        "model": request.model,
        "system": request.system,
        "messages": [{"role": "user", "content": request.user}],
        "temperature": TEMPERATURE,
        "max_tokens": MAX_TOKENS,
    });

    debug!("Requesting completion from Anthropic with model {}", request.model);

    let response = client
        .post(request.url)
        .header("x-api-key", request.api_key)
        .header("anthropic-version", ANTHROPIC_VERSION)
        .json(&body)
        .send()
        .await?;
    let parsed = read_json(response).await?;

    let text: String = parsed["content"]
        .as_array()
        .map(|blocks| {
            blocks
                .iter()
                .filter(|b| b["type"] == "text")
                .filter_map(|b| b["text"].as_str())
                .collect()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        Err(ProviderError::EmptyContent)
    } else {
        Ok(text)
    }
}

async fn read_json(response: reqwest::Response) -> Result<Value, ProviderError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ProviderError::Status {
            status: status.as_u16(),
            body: truncate(&body, 300),
        });
    }
    Ok(response.json::<Value>().await?)
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ProviderError::Status {
            status: 401,
            body: "invalid key".into(),
        };
        assert_eq!(err.to_string(), "API error 401: invalid key");
        assert_eq!(ProviderError::Timeout(45).to_string(), "timed out after 45s");
    }

    #[test]
    fn test_truncate_is_char_safe() {
        assert_eq!(truncate("ääää", 2), "ää");
        assert_eq!(truncate("ok", 10), "ok");
    }
}
