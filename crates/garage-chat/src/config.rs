//! Provider keys, default models, and per-request provider resolution.

use serde::{Deserialize, Serialize};

use crate::types::{LLMProvider, LlmOptions};

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-20250514";
pub const DEFAULT_GROQ_MODEL: &str = "llama-3.3-70b-versatile";

pub const OPENAI_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const ANTHROPIC_URL: &str = "https://api.anthropic.com/v1/messages";
pub const GROQ_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

/// Server-side provider settings. Keys supplied on a request take priority.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMConfig {
    #[serde(default)]
    pub default_provider: Option<LLMProvider>,
    #[serde(default)]
    pub openai_api_key: Option<String>,
    #[serde(default)]
    pub anthropic_api_key: Option<String>,
    #[serde(default)]
    pub groq_api_key: Option<String>,
    pub openai_model: String,
    pub anthropic_model: String,
    pub groq_model: String,
    /// Completion endpoints, overridable for proxies and gateways.
    pub openai_url: String,
    pub anthropic_url: String,
    pub groq_url: String,
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            default_provider: None,
            openai_api_key: None,
            anthropic_api_key: None,
            groq_api_key: None,
            openai_model: DEFAULT_OPENAI_MODEL.into(),
            anthropic_model: DEFAULT_ANTHROPIC_MODEL.into(),
            groq_model: DEFAULT_GROQ_MODEL.into(),
            openai_url: OPENAI_URL.into(),
            anthropic_url: ANTHROPIC_URL.into(),
            groq_url: GROQ_URL.into(),
        }
    }
}

/// Outcome of choosing a provider for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// No provider named anywhere.
    NoProvider,
    /// A provider name this service does not support.
    Unsupported(String),
    /// Provider chosen but no key on the request or the server.
    MissingKey(LLMProvider),
    Ready {
        provider: LLMProvider,
        model: String,
        api_key: String,
    },
}

fn filled(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

impl LLMConfig {
    /// Keys and default provider from the environment.
    pub fn from_env() -> Self {
        let env = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        Self {
            default_provider: env("GARAGE_LLM_PROVIDER").and_then(|p| LLMProvider::parse(&p)),
            openai_api_key: env("OPENAI_API_KEY"),
            anthropic_api_key: env("ANTHROPIC_API_KEY"),
            groq_api_key: env("GROQ_API_KEY"),
            openai_url: env("GARAGE_OPENAI_URL").unwrap_or_else(|| OPENAI_URL.into()),
            anthropic_url: env("GARAGE_ANTHROPIC_URL").unwrap_or_else(|| ANTHROPIC_URL.into()),
            groq_url: env("GARAGE_GROQ_URL").unwrap_or_else(|| GROQ_URL.into()),
            ..Self::default()
        }
    }

    pub fn key_for(&self, provider: LLMProvider) -> Option<&str> {
        let key = match provider {
            LLMProvider::OpenAI => self.openai_api_key.as_deref(),
            LLMProvider::Anthropic => self.anthropic_api_key.as_deref(),
            LLMProvider::Groq => self.groq_api_key.as_deref(),
        };
        filled(key)
    }

    pub fn url_for(&self, provider: LLMProvider) -> &str {
        match provider {
            LLMProvider::OpenAI => &self.openai_url,
            LLMProvider::Anthropic => &self.anthropic_url,
            LLMProvider::Groq => &self.groq_url,
        }
    }

    pub fn model_for(&self, provider: LLMProvider) -> &str {
        match provider {
            LLMProvider::OpenAI => &self.openai_model,
            LLMProvider::Anthropic => &self.anthropic_model,
            LLMProvider::Groq => &self.groq_model,
        }
    }

    /// Resolve provider, model, and key: request first, then server defaults.
    pub fn resolve(&self, options: &LlmOptions) -> Resolution {
        let provider = match filled(options.provider.as_deref()) {
            Some(name) if name.eq_ignore_ascii_case("none") => return Resolution::NoProvider,
            Some(name) => match LLMProvider::parse(name) {
                Some(p) => p,
                None => return Resolution::Unsupported(name.to_string()),
            },
            None => match self.default_provider {
                Some(p) => p,
                None => return Resolution::NoProvider,
            },
        };

        let api_key = filled(options.api_key.as_deref()).or_else(|| self.key_for(provider));
        let Some(api_key) = api_key else {
            return Resolution::MissingKey(provider);
        };

        let model = filled(options.model.as_deref()).unwrap_or_else(|| self.model_for(provider));

        Resolution::Ready {
            provider,
            model: model.to_string(),
            api_key: api_key.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(provider: Option<&str>, api_key: Option<&str>, model: Option<&str>) -> LlmOptions {
        LlmOptions {
            provider: provider.map(String::from),
            api_key: api_key.map(String::from),
            model: model.map(String::from),
        }
    }

    #[test]
    fn test_no_provider() {
        let config = LLMConfig::default();
        assert_eq!(config.resolve(&LlmOptions::default()), Resolution::NoProvider);
        assert_eq!(config.resolve(&options(Some("none"), None, None)), Resolution::NoProvider);
    }

    #[test]
    fn test_missing_key() {
        let config = LLMConfig::default();
        assert_eq!(
            config.resolve(&options(Some("openai"), Some("  "), None)),
            Resolution::MissingKey(LLMProvider::OpenAI)
        );
    }

    #[test]
    fn test_unsupported() {
        let config = LLMConfig::default();
        assert_eq!(
            config.resolve(&options(Some("palm"), Some("k"), None)),
            Resolution::Unsupported("palm".into())
        );
    }

    #[test]
    fn test_request_key_and_model_win() {
        let config = LLMConfig {
            groq_api_key: Some("server".into()),
            ..LLMConfig::default()
        };
        assert_eq!(
            config.resolve(&options(Some("Groq"), None, None)),
            Resolution::Ready {
                provider: LLMProvider::Groq,
                model: DEFAULT_GROQ_MODEL.into(),
                api_key: "server".into(),
            }
        );
        assert_eq!(
            config.resolve(&options(Some("groq"), Some("mine"), Some("llama-3.1-8b-instant"))),
            Resolution::Ready {
                provider: LLMProvider::Groq,
                model: "llama-3.1-8b-instant".into(),
                api_key: "mine".into(),
            }
        );
    }

    #[test]
    fn test_endpoint_per_provider() {
        let config = LLMConfig {
            groq_url: "http://127.0.0.1:9/v1/chat/completions".into(),
            ..LLMConfig::default()
        };
        assert_eq!(config.url_for(LLMProvider::OpenAI), OPENAI_URL);
        assert_eq!(config.url_for(LLMProvider::Anthropic), ANTHROPIC_URL);
        assert_eq!(config.url_for(LLMProvider::Groq), "http://127.0.0.1:9/v1/chat/completions");
    }

    #[test]
    fn test_server_default_provider() {
        let config = LLMConfig {
            default_provider: Some(LLMProvider::Anthropic),
            anthropic_api_key: Some("k".into()),
            ..LLMConfig::default()
        };
        match config.resolve(&LlmOptions::default()) {
            Resolution::Ready { provider, model, .. } => {
                assert_eq!(provider, LLMProvider::Anthropic);
                assert_eq!(model, DEFAULT_ANTHROPIC_MODEL);
            }
            other => panic!("unexpected resolution: {:?}", other),
        }
    }
}
