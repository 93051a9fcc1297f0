//! Error types for git-assist modules using thiserror.

use std::path::PathBuf;

use thiserror::Error;

use crate::ai::Provider;

/// Errors from loading or validating the configuration.
///
/// Always fatal and raised before any repository or network side effect.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(
        "Missing API key for '{model}'. Set `ai.\"{model}\"` in the config file or export {env_var}"
    )]
    MissingCredential {
        model: &'static str,
        env_var: &'static str,
    },

    #[error("Unsupported AI model '{0}'. Expected one of: deepseek, gpt-4o, claude-3.7-sonnet")]
    UnsupportedModel(String),

    #[error("Invalid commit message rule: {0}")]
    InvalidRule(String),

    #[error("No staging strategy is enabled. Enable at least one option under [stageOptions]")]
    NoStagingStrategy,

    #[error("Failed to read config file {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    ParseFailed {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Errors from the repository backend (the `git` binary).
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("git not found. Install git and make sure it is on your PATH")]
    GitNotInstalled,

    #[error("Not a git repository: {0}")]
    NotARepository(#[source] git2::Error),

    #[error("Bare repositories are not supported")]
    BareRepository,

    #[error("Failed to run git {operation}: {source}")]
    SpawnFailed {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("git {operation} failed: {stderr}")]
    CommandFailed { operation: String, stderr: String },

    #[error("{hook} hook `{command}` failed: {stderr}")]
    HookFailed {
        hook: &'static str,
        command: String,
        stderr: String,
    },

    #[error("Failed to read current branch: {0}")]
    BranchLookup(#[source] git2::Error),
}

/// Errors from a single AI provider call.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("{provider} request failed: {source}")]
    Request {
        provider: Provider,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} returned HTTP {status}: {body}")]
    Status {
        provider: Provider,
        status: u16,
        body: String,
    },

    #[error("{provider} returned an unexpected response: {detail}")]
    InvalidResponse { provider: Provider, detail: String },

    #[error("{provider} returned an empty completion")]
    EmptyResponse { provider: Provider },

    #[error("{provider} did not respond within {secs} seconds")]
    Timeout { provider: Provider, secs: u64 },
}

/// Errors from the AI gateway: either the configuration could not name a
/// usable provider, or the provider call itself failed.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// User input that violates the message rules. Recovered by re-prompting.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Description is required")]
    DescriptionRequired,

    #[error("Description must be at most {max} characters (got {actual})")]
    DescriptionTooLong { max: usize, actual: usize },
}

/// Errors from the interactive terminal itself (not cancellation).
#[derive(Error, Debug)]
pub enum PromptError {
    #[error("Interactive prompt failed: {0}")]
    Terminal(#[source] dialoguer::Error),
}

/// Errors from choosing a staging strategy.
#[derive(Error, Debug)]
pub enum StageError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Prompt(#[from] PromptError),
}

/// Errors that abort a commit workflow instance.
#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Repository error: {0}")]
    Backend(#[from] BackendError),

    #[error("AI provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Prompt(#[from] PromptError),
}

impl From<GatewayError> for WorkflowError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Config(e) => WorkflowError::Config(e),
            GatewayError::Provider(e) => WorkflowError::Provider(e),
        }
    }
}

impl From<StageError> for WorkflowError {
    fn from(err: StageError) -> Self {
        match err {
            StageError::Config(e) => WorkflowError::Config(e),
            StageError::Prompt(e) => WorkflowError::Prompt(e),
        }
    }
}
