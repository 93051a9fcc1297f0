//! The interactive commit workflow.
//!
//! ```text
//! SelectMode -> Stage? -> (AiGenerate | ManualInput) -> Confirm? -> Commit -> (PromptPush -> Push)? -> Done
//! ```
//!
//! Every prompt can end the run with [`WorkflowOutcome::Cancelled`]. Backend
//! mutations that already happened (staging, the commit itself) are never
//! rolled back.

use tracing::{debug, info, warn};

use crate::ai::CompletionGateway;
use crate::commit::message::{CommitAnswers, compose, validate_description};
use crate::commit::parse::answers_from_completion;
use crate::commit::prompt::build_commit_prompt;
use crate::config::{CommitMode, Config, MessageRules};
use crate::error::{ProviderError, ValidationError, WorkflowError};
use crate::git::{HookKind, RepositoryBackend, RepositoryStatus, get_status};
use crate::prompt::{Prompt, Prompter};
use crate::stage::{RelevanceSource, StagingOutcome, StagingReport, stage_changes};

/// Label of the "no scope" entry in the scope picker.
const NO_SCOPE: &str = "(no scope)";

/// What happened after the commit regarding push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    /// `askPush` is off.
    NotRequested,
    /// The user said no or backed out of the question.
    Declined,
    Pushed,
    /// The push failed; the commit stands.
    Failed(String),
}

/// A successful commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitSummary {
    /// Exactly the message passed to the backend.
    pub message: String,
    /// `None` when staging was not asked for or nothing was applied.
    pub staging: Option<StagingReport>,
    pub push: PushOutcome,
    /// Failure text of the post-commit hook, if it failed.
    pub post_commit_error: Option<String>,
}

/// Terminal state of one workflow run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowOutcome {
    Committed(CommitSummary),
    NothingToCommit,
    Cancelled,
}

enum State {
    SelectMode,
    Stage(CommitMode),
    Compose(CommitMode),
    Confirm(String),
    Commit(String),
    PromptPush(CommitSummary),
    Push(CommitSummary),
    Done(WorkflowOutcome),
}

/// One commit workflow over explicit collaborators.
pub struct CommitWorkflow<'a> {
    config: &'a Config,
    backend: &'a dyn RepositoryBackend,
    gateway: &'a dyn CompletionGateway,
    prompter: &'a dyn Prompter,
}

impl<'a> CommitWorkflow<'a> {
    pub fn new(
        config: &'a Config,
        backend: &'a dyn RepositoryBackend,
        gateway: &'a dyn CompletionGateway,
        prompter: &'a dyn Prompter,
    ) -> Self {
        Self {
            config,
            backend,
            gateway,
            prompter,
        }
    }

    fn rules(&self) -> &MessageRules {
        &self.config.commit.message
    }

    /// Run the workflow to a terminal state.
    pub async fn run(&self) -> Result<WorkflowOutcome, WorkflowError> {
        let status = get_status(self.backend)?;
        if status.is_empty() {
            info!("Working tree is clean");
            return Ok(WorkflowOutcome::NothingToCommit);
        }
        if !self.config.commit.ask_stage && status.staged_count() == 0 {
            info!("Nothing staged and staging is not offered");
            return Ok(WorkflowOutcome::NothingToCommit);
        }

        let mut staging = None;
        let mut state = State::SelectMode;
        loop {
            state = match state {
                State::SelectMode => match self.select_mode()? {
                    Prompt::Cancelled => State::Done(WorkflowOutcome::Cancelled),
                    Prompt::Answer(mode) if self.config.commit.ask_stage => State::Stage(mode),
                    Prompt::Answer(mode) => State::Compose(mode),
                },
                State::Stage(mode) => match self.stage(&status).await? {
                    Prompt::Cancelled => State::Done(WorkflowOutcome::Cancelled),
                    Prompt::Answer(report) => {
                        let staged_now = report.as_ref().is_some_and(|r| !r.staged.is_empty());
                        if !staged_now && status.staged_count() == 0 {
                            self.prompter.notify("Nothing staged for commit.");
                            State::Done(WorkflowOutcome::NothingToCommit)
                        } else {
                            staging = report;
                            State::Compose(mode)
                        }
                    }
                },
                State::Compose(mode) => {
                    let answers = match mode {
                        CommitMode::Ai => Prompt::Answer(self.generate_answers(&status).await?),
                        CommitMode::Manual => self.manual_answers()?,
                    };
                    match answers {
                        Prompt::Cancelled => State::Done(WorkflowOutcome::Cancelled),
                        Prompt::Answer(answers) => State::Confirm(compose(self.rules(), &answers)),
                    }
                }
                State::Confirm(message) => {
                    if !self.config.commit.ask_confirm {
                        State::Commit(message)
                    } else {
                        self.prompter.notify(&format!("\n{message}\n"));
                        match self.prompter.confirm("Commit with this message?", true)? {
                            Prompt::Answer(true) => State::Commit(message),
                            Prompt::Answer(false) | Prompt::Cancelled => {
                                State::Done(WorkflowOutcome::Cancelled)
                            }
                        }
                    }
                }
                State::Commit(message) => {
                    let post_commit_error = self.commit(&message)?;
                    let summary = CommitSummary {
                        message,
                        staging: staging.take(),
                        push: PushOutcome::NotRequested,
                        post_commit_error,
                    };
                    if self.config.commit.ask_push {
                        State::PromptPush(summary)
                    } else {
                        State::Done(WorkflowOutcome::Committed(summary))
                    }
                }
                State::PromptPush(summary) => {
                    match self.prompter.confirm("Push changes to remote?", true)? {
                        Prompt::Answer(true) => State::Push(summary),
                        Prompt::Answer(false) | Prompt::Cancelled => {
                            State::Done(WorkflowOutcome::Committed(CommitSummary {
                                push: PushOutcome::Declined,
                                ..summary
                            }))
                        }
                    }
                }
                State::Push(summary) => {
                    let push = match self.backend.push() {
                        Ok(()) => {
                            info!("Pushed to remote");
                            PushOutcome::Pushed
                        }
                        Err(e) => {
                            warn!("Push failed: {}", e);
                            self.prompter.notify(&format!("Push failed: {e}"));
                            PushOutcome::Failed(e.to_string())
                        }
                    };
                    State::Done(WorkflowOutcome::Committed(CommitSummary { push, ..summary }))
                }
                State::Done(outcome) => return Ok(outcome),
            };
        }
    }

    /// The chosen mode. AI mode requires the selected provider's credential
    /// here, before staging touches the repository.
    fn select_mode(&self) -> Result<Prompt<CommitMode>, WorkflowError> {
        let configured = self.config.commit.mode;
        let choice = if self.config.commit.ask_mode {
            let modes = [CommitMode::Ai, CommitMode::Manual];
            let labels: Vec<String> = modes.iter().map(|m| m.label().to_string()).collect();
            let default = modes.iter().position(|m| *m == configured).unwrap_or(0);
            self.prompter
                .select("Select commit mode:", &labels, default)?
                .map(|index| modes[index])
        } else {
            Prompt::Answer(configured)
        };

        if choice == Prompt::Answer(CommitMode::Ai) {
            self.config.ai.credential()?;
        }
        Ok(choice)
    }

    /// `Answer(None)` means nothing was staged by this step.
    async fn stage(
        &self,
        status: &RepositoryStatus,
    ) -> Result<Prompt<Option<StagingReport>>, WorkflowError> {
        let relevance = RelevanceSource {
            gateway: self.gateway,
            ai: &self.config.ai,
        };
        let outcome = stage_changes(
            &self.config.stage_options,
            status,
            self.backend,
            self.prompter,
            Some(relevance),
        )
        .await?;

        Ok(match outcome {
            StagingOutcome::Cancelled => Prompt::Cancelled,
            StagingOutcome::NothingToStage | StagingOutcome::NothingSelected => Prompt::Answer(None),
            StagingOutcome::Applied(report) => Prompt::Answer(Some(report)),
        })
    }

    async fn generate_answers(
        &self,
        status: &RepositoryStatus,
    ) -> Result<CommitAnswers, WorkflowError> {
        let rules = self.rules();
        let diff = self.backend.diff(true)?;
        let branch = match self.backend.current_branch() {
            Ok(branch) => branch,
            Err(e) => {
                debug!("Branch name unavailable: {}", e);
                None
            }
        };

        let prompt = build_commit_prompt(&diff, status, rules, branch.as_deref());
        debug!("Commit prompt length: {} chars", prompt.len());
        self.prompter.notify("Generating commit message...");

        let response = self.gateway.generate(&prompt, &self.config.ai).await?;
        let answers = answers_from_completion(&response.content, rules);

        if rules.description.required && answers.description.is_empty() {
            let provider = self.config.ai.provider()?;
            return Err(ProviderError::InvalidResponse {
                provider,
                detail: "no commit description in the response".to_string(),
            }
            .into());
        }
        Ok(answers)
    }

    fn manual_answers(&self) -> Result<Prompt<CommitAnswers>, WorkflowError> {
        let rules = self.rules();

        let commit_type = if self.config.commit.ask_type {
            let labels: Vec<String> = rules.types.iter().map(|t| t.display()).collect();
            match self.prompter.select("Select commit type:", &labels, 0)? {
                Prompt::Answer(index) => rules.types.get(index).map(|t| t.value.clone()),
                Prompt::Cancelled => return Ok(Prompt::Cancelled),
            }
        } else {
            None
        };
        let commit_type = commit_type
            .or_else(|| rules.default_type().map(|t| t.value.clone()))
            .unwrap_or_default();

        let scope = if self.config.commit.ask_scope {
            match self.ask_scope()? {
                Prompt::Answer(scope) => scope,
                Prompt::Cancelled => return Ok(Prompt::Cancelled),
            }
        } else {
            String::new()
        };

        let description = match self.ask_description()? {
            Prompt::Answer(description) => description,
            Prompt::Cancelled => return Ok(Prompt::Cancelled),
        };

        Ok(Prompt::Answer(CommitAnswers {
            emoji: rules.emoji_for(&commit_type),
            commit_type,
            scope,
            description,
            bullet_points: Vec::new(),
        }))
    }

    fn ask_scope(&self) -> Result<Prompt<String>, WorkflowError> {
        let scopes = &self.rules().scope;
        if scopes.is_empty() {
            let answer = self.prompter.input("Enter scope (optional):", "")?;
            return Ok(answer.map(|s| s.trim().to_string()));
        }

        let mut items = vec![NO_SCOPE.to_string()];
        items.extend(scopes.iter().cloned());
        let choice = self.prompter.select("Select scope:", &items, 0)?;
        Ok(choice.map(|index| match index {
            0 => String::new(),
            i => scopes.get(i - 1).cloned().unwrap_or_default(),
        }))
    }

    /// Re-asks until the description passes validation.
    fn ask_description(&self) -> Result<Prompt<String>, WorkflowError> {
        let mut initial = String::new();
        loop {
            let answer = match self.prompter.input("Enter commit description:", &initial)? {
                Prompt::Answer(answer) => answer,
                Prompt::Cancelled => return Ok(Prompt::Cancelled),
            };
            match validate_description(self.rules(), &answer) {
                Ok(()) => return Ok(Prompt::Answer(answer.trim().to_string())),
                Err(ValidationError::DescriptionRequired) => {
                    // Free-text input cannot be escaped, so an empty answer
                    // offers the way out.
                    self.prompter.notify(&ValidationError::DescriptionRequired.to_string());
                    match self.prompter.confirm("Cancel this commit?", false)? {
                        Prompt::Answer(false) => initial = String::new(),
                        Prompt::Answer(true) | Prompt::Cancelled => return Ok(Prompt::Cancelled),
                    }
                }
                Err(e) => {
                    self.prompter.notify(&e.to_string());
                    initial = answer;
                }
            }
        }
    }

    /// Run hooks around the commit. Returns the post-commit hook failure, if any.
    fn commit(&self, message: &str) -> Result<Option<String>, WorkflowError> {
        let hooks = &self.config.hooks;
        if !hooks.pre_commit.trim().is_empty() {
            self.backend.run_hook(HookKind::PreCommit, &hooks.pre_commit)?;
        }

        self.backend.commit(message)?;
        info!("Committed: {}", message.lines().next().unwrap_or_default());

        if hooks.post_commit.trim().is_empty() {
            return Ok(None);
        }
        match self.backend.run_hook(HookKind::PostCommit, &hooks.post_commit) {
            Ok(()) => Ok(None),
            Err(e) => {
                warn!("{}", e);
                self.prompter.notify(&e.to_string());
                Ok(Some(e.to_string()))
            }
        }
    }
}
