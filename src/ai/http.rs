//! Shared HTTP helpers for provider clients.

use reqwest::Response;
use serde::de::DeserializeOwned;

use crate::ai::Provider;
use crate::error::ProviderError;

/// Maximum number of response-body characters kept in an error message.
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Turn a non-success status into [`ProviderError::Status`], otherwise decode
/// the JSON body into `T`.
pub(crate) async fn read_json<T: DeserializeOwned>(
    provider: Provider,
    response: Response,
) -> Result<T, ProviderError> {
    let status = response.status();

    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        return Err(ProviderError::Status {
            provider,
            status: status.as_u16(),
            body: truncate_chars(body.trim(), MAX_ERROR_BODY_CHARS),
        });
    }

    let text = response
        .text()
        .await
        .map_err(|source| ProviderError::Request { provider, source })?;

    serde_json::from_str(&text).map_err(|e| ProviderError::InvalidResponse {
        provider,
        detail: format!("{}. Body: {}", e, truncate_chars(&text, MAX_ERROR_BODY_CHARS)),
    })
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
