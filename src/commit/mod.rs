//! Commit message synthesis and the interactive commit workflow.

pub mod message;
pub mod parse;
pub mod prompt;
pub mod workflow;

pub use message::{CommitAnswers, compose, truncate_description, validate_description};
pub use parse::answers_from_completion;
pub use prompt::{build_commit_prompt, build_relevance_prompt, sanitize_diff};
pub use workflow::{CommitSummary, CommitWorkflow, PushOutcome, WorkflowOutcome};
