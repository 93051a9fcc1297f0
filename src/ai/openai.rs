//! OpenAI-compatible chat completions (used by OpenAI and Deepseek).

use serde::{Deserialize, Serialize};

use crate::ai::http::read_json;
use crate::ai::provider::{CompletionResponse, MAX_COMPLETION_TOKENS, Provider, SYSTEM_PROMPT, Usage};
use crate::error::ProviderError;

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'static str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

/// Send one chat completion request with bearer authentication.
pub(crate) async fn complete(
    client: &reqwest::Client,
    endpoint: &str,
    provider: Provider,
    api_key: &str,
    prompt: &str,
) -> Result<CompletionResponse, ProviderError> {
    let request = ChatRequest {
        model: provider.model_id(),
        messages: vec![
            ChatMessage {
                role: "system",
                content: SYSTEM_PROMPT,
            },
            ChatMessage {
                role: "user",
                content: prompt,
            },
        ],
        max_tokens: MAX_COMPLETION_TOKENS,
    };

    let response = client
        .post(endpoint)
        .bearer_auth(api_key)
        .json(&request)
        .send()
        .await
        .map_err(|source| ProviderError::Request { provider, source })?;

    let body: ChatResponse = read_json(provider, response).await?;
    normalize(provider, body)
}

fn normalize(provider: Provider, body: ChatResponse) -> Result<CompletionResponse, ProviderError> {
    let content = body
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| ProviderError::InvalidResponse {
            provider,
            detail: "response contained no choices".to_string(),
        })?;

    Ok(CompletionResponse {
        content,
        usage: body.usage.map(|u| Usage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        }),
    })
}
