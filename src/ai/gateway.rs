//! Provider dispatch.
//!
//! The provider is chosen exclusively by `ai.useModel` at call time. A
//! failure from that provider is returned as-is: there is no retry and no
//! fallback to another provider.

use std::env;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::ai::provider::{CompletionResponse, Provider};
use crate::ai::{anthropic, openai};
use crate::config::AiConfig;
use crate::error::{GatewayError, ProviderError};

/// Default timeout for one provider call.
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Environment variable to override the default timeout.
const TIMEOUT_ENV_VAR: &str = "GIT_ASSIST_AI_TIMEOUT";

/// Get the configured timeout duration.
///
/// Reads from GIT_ASSIST_AI_TIMEOUT if set, otherwise uses the default of
/// 60 seconds. Invalid values, including 0, log a warning and fall back to
/// the default.
fn get_timeout() -> Duration {
    match env::var(TIMEOUT_ENV_VAR) {
        Ok(v) if !v.is_empty() => match v.parse::<u64>() {
            Ok(secs) if secs > 0 => Duration::from_secs(secs),
            _ => {
                warn!(
                    "Invalid {} value '{}', using default {}s",
                    TIMEOUT_ENV_VAR, v, DEFAULT_TIMEOUT_SECS
                );
                Duration::from_secs(DEFAULT_TIMEOUT_SECS)
            }
        },
        _ => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
    }
}

/// Turns a prompt into a completion using the configured provider.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionGateway: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        ai: &AiConfig,
    ) -> Result<CompletionResponse, GatewayError>;
}

/// Provider endpoint URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub deepseek: String,
    pub openai: String,
    pub anthropic: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            deepseek: "https://api.deepseek.com/chat/completions".to_string(),
            openai: "https://api.openai.com/v1/chat/completions".to_string(),
            anthropic: "https://api.anthropic.com/v1/messages".to_string(),
        }
    }
}

impl Endpoints {
    /// Point every provider at `base` (e.g. a local mock server).
    pub fn all_at(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            deepseek: format!("{base}/chat/completions"),
            openai: format!("{base}/v1/chat/completions"),
            anthropic: format!("{base}/v1/messages"),
        }
    }

    pub fn for_provider(&self, provider: Provider) -> &str {
        match provider {
            Provider::Deepseek => &self.deepseek,
            Provider::OpenAi => &self.openai,
            Provider::Anthropic => &self.anthropic,
        }
    }
}

/// HTTP-backed gateway over the supported providers.
pub struct AiGateway {
    client: reqwest::Client,
    endpoints: Endpoints,
    timeout: Duration,
}

impl AiGateway {
    pub fn new() -> Self {
        Self::with_endpoints(Endpoints::default())
    }

    pub fn with_endpoints(endpoints: Endpoints) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoints,
            timeout: get_timeout(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn dispatch(
        &self,
        provider: Provider,
        api_key: &str,
        prompt: &str,
    ) -> Result<CompletionResponse, ProviderError> {
        let endpoint = self.endpoints.for_provider(provider);
        match provider {
            Provider::Deepseek | Provider::OpenAi => {
                openai::complete(&self.client, endpoint, provider, api_key, prompt).await
            }
            Provider::Anthropic => anthropic::complete(&self.client, endpoint, api_key, prompt).await,
        }
    }
}

impl Default for AiGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompletionGateway for AiGateway {
    async fn generate(
        &self,
        prompt: &str,
        ai: &AiConfig,
    ) -> Result<CompletionResponse, GatewayError> {
        // Resolved before any network activity.
        let (provider, api_key) = ai.credential()?;

        debug!(
            "Requesting completion from {} ({} prompt chars)",
            provider,
            prompt.len()
        );

        let response = timeout(self.timeout, self.dispatch(provider, api_key, prompt))
            .await
            .map_err(|_| ProviderError::Timeout {
                provider,
                secs: self.timeout.as_secs(),
            })??;

        if response.content.trim().is_empty() {
            return Err(ProviderError::EmptyResponse { provider }.into());
        }

        if let Some(usage) = response.usage {
            debug!(
                "{} usage: {} prompt + {} completion = {} tokens",
                provider, usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
            );
        }

        Ok(response)
    }
}
