//! Anthropic Messages API client.

use serde::{Deserialize, Serialize};

use crate::ai::http::read_json;
use crate::ai::provider::{CompletionResponse, MAX_COMPLETION_TOKENS, Provider, SYSTEM_PROMPT, Usage};
use crate::error::ProviderError;

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'static str,
    system: &'static str,
    max_tokens: u32,
    messages: Vec<UserMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct UserMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    usage: Option<MessagesUsage>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MessagesUsage {
    input_tokens: u32,
    output_tokens: u32,
}

/// Send one Messages API request.
pub(crate) async fn complete(
    client: &reqwest::Client,
    endpoint: &str,
    api_key: &str,
    prompt: &str,
) -> Result<CompletionResponse, ProviderError> {
    let provider = Provider::Anthropic;
    let request = MessagesRequest {
        model: provider.model_id(),
        system: SYSTEM_PROMPT,
        max_tokens: MAX_COMPLETION_TOKENS,
        messages: vec![UserMessage {
            role: "user",
            content: prompt,
        }],
    };

    let response = client
        .post(endpoint)
        .header("x-api-key", api_key)
        .header("anthropic-version", ANTHROPIC_VERSION)
        .json(&request)
        .send()
        .await
        .map_err(|source| ProviderError::Request { provider, source })?;

    let body: MessagesResponse = read_json(provider, response).await?;
    normalize(body)
}

fn normalize(body: MessagesResponse) -> Result<CompletionResponse, ProviderError> {
    let content = body
        .content
        .into_iter()
        .find(|block| block.kind == "text")
        .and_then(|block| block.text)
        .ok_or_else(|| ProviderError::InvalidResponse {
            provider: Provider::Anthropic,
            detail: "response contained no text block".to_string(),
        })?;

    Ok(CompletionResponse {
        content,
        usage: body.usage.map(|u| Usage {
            prompt_tokens: u.input_tokens,
            completion_tokens: u.output_tokens,
            total_tokens: u.input_tokens + u.output_tokens,
        }),
    })
}
