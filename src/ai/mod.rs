//! AI provider gateway: one interface over the supported completion APIs.

pub mod anthropic;
pub mod gateway;
mod http;
pub mod json;
pub mod openai;
pub mod provider;

pub use gateway::{AiGateway, CompletionGateway, Endpoints};
pub use json::find_json_object;
pub use provider::{CompletionResponse, MAX_COMPLETION_TOKENS, Provider, SYSTEM_PROMPT, Usage};
