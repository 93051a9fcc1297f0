//! git-assist - guided git commits with optional AI-generated messages.
//!
//! # Overview
//!
//! git-assist walks through staging, composing a conventional commit message
//! (by hand or from an AI provider), committing and pushing. The repository
//! itself is driven through the system `git`; AI providers are reached over
//! HTTPS.

pub mod ai;
pub mod commit;
pub mod config;
pub mod error;
pub mod git;
pub mod prompt;
pub mod stage;

// Re-export commonly used types
pub use ai::{AiGateway, CompletionGateway, CompletionResponse, Provider};
pub use commit::{CommitAnswers, CommitWorkflow, WorkflowOutcome, compose};
pub use config::{Config, load_config};
pub use error::{
    BackendError, ConfigError, GatewayError, PromptError, ProviderError, StageError,
    ValidationError, WorkflowError,
};
pub use git::{GitCli, RepositoryBackend, RepositoryStatus, StatusCode};
pub use prompt::{Prompt, Prompter, TerminalPrompter};
