//! Supported AI providers and the normalized completion shape.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::ConfigError;

/// Fixed system instruction sent with every completion request.
pub const SYSTEM_PROMPT: &str = "Generate a concise commit message";

/// Response token ceiling. Keeps generated messages terse.
pub const MAX_COMPLETION_TOKENS: u32 = 200;

/// Supported AI providers, one per `ai.useModel` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    Deepseek,
    OpenAi,
    Anthropic,
}

impl Provider {
    pub const ALL: [Provider; 3] = [Provider::Deepseek, Provider::OpenAi, Provider::Anthropic];

    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Deepseek => "Deepseek",
            Provider::OpenAi => "OpenAI",
            Provider::Anthropic => "Anthropic",
        }
    }

    /// The `useModel` key selecting this provider (also its credential key).
    pub fn config_key(&self) -> &'static str {
        match self {
            Provider::Deepseek => "deepseek",
            Provider::OpenAi => "gpt-4o",
            Provider::Anthropic => "claude-3.7-sonnet",
        }
    }

    /// Model identifier sent on the wire.
    pub fn model_id(&self) -> &'static str {
        match self {
            Provider::Deepseek => "deepseek-chat",
            Provider::OpenAi => "gpt-4o",
            Provider::Anthropic => "claude-3-7-sonnet-20250219",
        }
    }

    /// Environment variable consulted when the config credential is empty.
    pub fn env_var(&self) -> &'static str {
        match self {
            Provider::Deepseek => "DEEPSEEK_API_KEY",
            Provider::OpenAi => "OPENAI_API_KEY",
            Provider::Anthropic => "ANTHROPIC_API_KEY",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "deepseek" => Ok(Provider::Deepseek),
            "gpt-4o" => Ok(Provider::OpenAi),
            "claude-3.7-sonnet" => Ok(Provider::Anthropic),
            other => Err(ConfigError::UnsupportedModel(other.to_string())),
        }
    }
}

/// Token counters reported by a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Provider-independent completion result.
///
/// `usage` is advisory telemetry and is `None` when the provider omits it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionResponse {
    pub content: String,
    pub usage: Option<Usage>,
}
