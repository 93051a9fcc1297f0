//! Staging orchestrator.
//!
//! Turns a staging strategy plus a status snapshot into concrete stage
//! operations ([`resolve_staging`]) and runs them against the backend
//! ([`apply_staging`]). Resolution only asks questions; it never touches the
//! repository.

use serde::Deserialize;
use tracing::{debug, warn};

use crate::ai::{CompletionGateway, find_json_object};
use crate::commit::prompt::build_relevance_prompt;
use crate::config::{AiConfig, StageOptions};
use crate::error::{ConfigError, PromptError, StageError};
use crate::git::{RepositoryBackend, RepositoryStatus};
use crate::prompt::{Prompt, Prompter};

/// How changes are chosen for staging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StagingStrategy {
    /// The whole working tree.
    All,
    /// Chosen top-level directories, one backend call each.
    Folder,
    /// Chosen files.
    Manual,
    /// Files suggested by the AI provider, confirmed in the manual picker.
    Relevant,
}

impl StagingStrategy {
    pub fn label(&self) -> &'static str {
        match self {
            StagingStrategy::All => "Stage all changes",
            StagingStrategy::Folder => "Stage by folder",
            StagingStrategy::Manual => "Stage manually",
            StagingStrategy::Relevant => "Stage AI-suggested files",
        }
    }
}

/// Strategies switched on in `stageOptions`, in menu order.
pub fn enabled_strategies(options: &StageOptions) -> Vec<StagingStrategy> {
    [
        (options.enable_stage_all, StagingStrategy::All),
        (options.enable_stage_by_folder, StagingStrategy::Folder),
        (options.enable_stage_relevant, StagingStrategy::Relevant),
        (options.enable_stage_manual, StagingStrategy::Manual),
    ]
    .into_iter()
    .filter_map(|(enabled, strategy)| enabled.then_some(strategy))
    .collect()
}

/// Ask which strategy to use. A single enabled strategy is used without asking.
pub fn choose_strategy(
    options: &StageOptions,
    prompter: &dyn Prompter,
) -> Result<Prompt<StagingStrategy>, StageError> {
    let strategies = enabled_strategies(options);
    match strategies.as_slice() {
        [] => Err(ConfigError::NoStagingStrategy.into()),
        [only] => Ok(Prompt::Answer(*only)),
        _ => {
            let labels: Vec<String> = strategies.iter().map(|s| s.label().to_string()).collect();
            let choice =
                prompter.select("How would you like to stage your changes?", &labels, 0)?;
            Ok(choice.map(|index| strategies[index]))
        }
    }
}

/// One backend stage call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageOperation {
    pub paths: Vec<String>,
}

impl StageOperation {
    pub fn new(paths: Vec<String>) -> Self {
        Self { paths }
    }

    /// Stage the whole working tree.
    pub fn whole_tree() -> Self {
        Self::new(vec![".".to_string()])
    }
}

/// Result of resolving a strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StagingPlan {
    /// The status snapshot was empty; no strategy was consulted.
    NothingToStage,
    /// The user selected nothing. Not an error.
    NothingSelected,
    Cancelled,
    Stage(Vec<StageOperation>),
}

/// A stage operation that the backend rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageFailure {
    pub paths: Vec<String>,
    pub error: String,
}

/// What [`apply_staging`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StagingReport {
    /// Paths of every successful operation, in order.
    pub staged: Vec<String>,
    pub failures: Vec<StageFailure>,
}

impl StagingReport {
    pub fn is_empty(&self) -> bool {
        self.staged.is_empty() && self.failures.is_empty()
    }
}

/// Provider access for the [`StagingStrategy::Relevant`] strategy.
#[derive(Clone, Copy)]
pub struct RelevanceSource<'a> {
    pub gateway: &'a dyn CompletionGateway,
    pub ai: &'a AiConfig,
}

/// Resolve `strategy` against `status` into stage operations.
///
/// An empty status short-circuits before any question is asked. Without a
/// [`RelevanceSource`], or when the provider fails, `Relevant` behaves like
/// `Manual`.
pub async fn resolve_staging(
    strategy: StagingStrategy,
    status: &RepositoryStatus,
    prompter: &dyn Prompter,
    relevance: Option<RelevanceSource<'_>>,
) -> Result<StagingPlan, PromptError> {
    if status.is_empty() {
        return Ok(StagingPlan::NothingToStage);
    }

    match strategy {
        StagingStrategy::All => Ok(StagingPlan::Stage(vec![StageOperation::whole_tree()])),
        StagingStrategy::Folder => resolve_folders(status, prompter),
        StagingStrategy::Manual => resolve_files(status, prompter, &[]),
        StagingStrategy::Relevant => {
            let suggested = match relevance {
                Some(source) => suggest_relevant(status, source).await,
                None => {
                    debug!("No AI provider available, staging manually");
                    Vec::new()
                }
            };
            resolve_files(status, prompter, &suggested)
        }
    }
}

fn resolve_folders(
    status: &RepositoryStatus,
    prompter: &dyn Prompter,
) -> Result<StagingPlan, PromptError> {
    let folders = status.top_level_directories();
    if folders.is_empty() {
        prompter.notify("No changed folders; pick files instead.");
        return resolve_files(status, prompter, &[]);
    }

    let checked = vec![false; folders.len()];
    match prompter.multi_select("Select folders to stage", &folders, &checked)? {
        Prompt::Cancelled => Ok(StagingPlan::Cancelled),
        Prompt::Answer(chosen) if chosen.is_empty() => Ok(StagingPlan::NothingSelected),
        Prompt::Answer(chosen) => Ok(StagingPlan::Stage(
            chosen
                .into_iter()
                .filter_map(|i| folders.get(i))
                .map(|folder| StageOperation::new(vec![folder.clone()]))
                .collect(),
        )),
    }
}

fn resolve_files(
    status: &RepositoryStatus,
    prompter: &dyn Prompter,
    preselected: &[String],
) -> Result<StagingPlan, PromptError> {
    let files = status.files();
    let items: Vec<String> = files
        .iter()
        .map(|f| format!("{} ({})", f.path, f.status))
        .collect();
    let checked: Vec<bool> = files
        .iter()
        .map(|f| preselected.contains(&f.path))
        .collect();

    match prompter.multi_select("Select files to stage", &items, &checked)? {
        Prompt::Cancelled => Ok(StagingPlan::Cancelled),
        Prompt::Answer(chosen) if chosen.is_empty() => Ok(StagingPlan::NothingSelected),
        Prompt::Answer(chosen) => {
            let paths: Vec<String> = chosen
                .into_iter()
                .filter_map(|i| files.get(i))
                .map(|f| f.path.clone())
                .collect();
            Ok(StagingPlan::Stage(vec![StageOperation::new(paths)]))
        }
    }
}

#[derive(Debug, Deserialize)]
struct RelevantFiles {
    files: Vec<String>,
}

/// Paths the provider considers one coherent change, limited to the snapshot.
/// Any failure yields an empty suggestion.
async fn suggest_relevant(status: &RepositoryStatus, source: RelevanceSource<'_>) -> Vec<String> {
    let prompt = build_relevance_prompt(status);
    let response = match source.gateway.generate(&prompt, source.ai).await {
        Ok(response) => response,
        Err(e) => {
            warn!("AI file suggestion unavailable, staging manually: {}", e);
            return Vec::new();
        }
    };

    let parsed = find_json_object(&response.content)
        .and_then(|json| serde_json::from_str::<RelevantFiles>(&json).ok());
    match parsed {
        Some(relevant) => relevant
            .files
            .into_iter()
            .filter(|path| status.contains_path(path))
            .collect(),
        None => {
            warn!("Could not read AI file suggestion, staging manually");
            Vec::new()
        }
    }
}

/// Run each operation. A failed operation is recorded and the rest still run.
pub fn apply_staging(operations: &[StageOperation], backend: &dyn RepositoryBackend) -> StagingReport {
    let mut report = StagingReport::default();
    for operation in operations {
        match backend.stage(&operation.paths) {
            Ok(()) => {
                debug!("Staged {:?}", operation.paths);
                report.staged.extend(operation.paths.iter().cloned());
            }
            Err(e) => {
                warn!("Failed to stage {:?}: {}", operation.paths, e);
                report.failures.push(StageFailure {
                    paths: operation.paths.clone(),
                    error: e.to_string(),
                });
            }
        }
    }
    report
}

/// Outcome of the full staging step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StagingOutcome {
    NothingToStage,
    NothingSelected,
    Cancelled,
    Applied(StagingReport),
}

/// Choose a strategy, resolve it and apply it.
pub async fn stage_changes(
    options: &StageOptions,
    status: &RepositoryStatus,
    backend: &dyn RepositoryBackend,
    prompter: &dyn Prompter,
    relevance: Option<RelevanceSource<'_>>,
) -> Result<StagingOutcome, StageError> {
    if status.is_empty() {
        return Ok(StagingOutcome::NothingToStage);
    }

    let strategy = match choose_strategy(options, prompter)? {
        Prompt::Answer(strategy) => strategy,
        Prompt::Cancelled => return Ok(StagingOutcome::Cancelled),
    };
    debug!("Staging strategy: {:?}", strategy);

    let outcome = match resolve_staging(strategy, status, prompter, relevance).await? {
        StagingPlan::NothingToStage => StagingOutcome::NothingToStage,
        StagingPlan::NothingSelected => StagingOutcome::NothingSelected,
        StagingPlan::Cancelled => StagingOutcome::Cancelled,
        StagingPlan::Stage(operations) => {
            let report = apply_staging(&operations, backend);
            for failure in &report.failures {
                prompter.notify(&format!(
                    "Could not stage {}: {}",
                    failure.paths.join(", "),
                    failure.error
                ));
            }
            StagingOutcome::Applied(report)
        }
    };
    Ok(outcome)
}
