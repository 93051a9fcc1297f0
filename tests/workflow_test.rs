//! End-to-end commit workflow tests against real repositories.
//!
//! Only the terminal and the AI provider are scripted; staging, hooks and
//! commits go through the `git` binary.

mod common;

use common::{FixedGateway, Reply, ScriptedPrompter, TestRepo};
use git_assist::commit::{CommitWorkflow, PushOutcome, WorkflowOutcome};
use git_assist::config::{CommitMode, Config, StageOptions};
use git_assist::error::{BackendError, WorkflowError};
use git_assist::git::{RepositoryBackend, get_status};
use git_assist::prompt::Prompt;

fn stage_options(all: bool, manual: bool) -> StageOptions {
    StageOptions {
        enable_stage_all: all,
        enable_stage_by_folder: false,
        enable_stage_relevant: false,
        enable_stage_manual: manual,
    }
}

fn manual_config() -> Config {
    let mut config = Config::default();
    config.commit.mode = CommitMode::Manual;
    config.commit.ask_mode = false;
    config.commit.ask_push = false;
    config.commit.message.emoji.enabled = false;
    config.stage_options = stage_options(true, false);
    config
}

#[tokio::test]
async fn test_manual_commit_stages_everything() {
    let repo = TestRepo::with_initial_commit();
    repo.write("src/parser.rs", "pub fn parse() {}\n");
    let backend = repo.backend();
    let config = manual_config();
    let gateway = FixedGateway::new("unused");
    let prompter = ScriptedPrompter::new([
        Reply::Select(Prompt::Answer(0)),
        Reply::Select(Prompt::Answer(0)),
        Reply::Input(Prompt::Answer("add parser".to_string())),
        Reply::Confirm(Prompt::Answer(true)),
    ]);

    let outcome = CommitWorkflow::new(&config, &backend, &gateway, &prompter)
        .run()
        .await
        .unwrap();

    let WorkflowOutcome::Committed(summary) = outcome else {
        panic!("expected a commit");
    };
    assert_eq!(summary.message, "feat: add parser");
    assert_eq!(summary.push, PushOutcome::NotRequested);
    assert_eq!(repo.head_message().trim_end(), "feat: add parser");
    assert_eq!(repo.commit_count(), 2);
    assert!(get_status(&backend).unwrap().is_empty());
    assert!(gateway.prompts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_manual_file_pick_leaves_other_changes() {
    let repo = TestRepo::with_initial_commit();
    repo.write("README.md", "# edited\n");
    repo.write("parser.rs", "pub fn parse() {}\n");
    let backend = repo.backend();

    let mut config = manual_config();
    config.stage_options = stage_options(false, true);
    config.commit.message.emoji.enabled = true;

    let gateway = FixedGateway::new("unused");
    let prompter = ScriptedPrompter::new([
        // " M README.md" sorts before "?? parser.rs".
        Reply::MultiSelect(Prompt::Answer(vec![1])),
        Reply::Select(Prompt::Answer(1)),
        Reply::Select(Prompt::Answer(2)),
        Reply::Input(Prompt::Answer("handle empty input".to_string())),
        Reply::Confirm(Prompt::Answer(true)),
    ]);

    let outcome = CommitWorkflow::new(&config, &backend, &gateway, &prompter)
        .run()
        .await
        .unwrap();

    assert!(matches!(outcome, WorkflowOutcome::Committed(_)));
    assert_eq!(
        repo.head_message().trim_end(),
        "fix(backend): handle empty input 🐛"
    );

    let remaining = get_status(&backend).unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining.files()[0].path, "README.md");
}

#[tokio::test]
async fn test_ai_commit_uses_staged_diff() {
    let repo = TestRepo::with_initial_commit();
    repo.write("lexer.rs", "pub struct Token;\n");
    repo.stage("lexer.rs");
    let backend = repo.backend();

    let mut config = manual_config();
    config.commit.mode = CommitMode::Ai;
    config.commit.ask_stage = false;
    config.commit.ask_confirm = false;
    config.ai.deepseek = "sk-test".to_string();

    let gateway = FixedGateway::new(
        r#"{"type": "feat", "scope": "none", "description": "add token type.", "bullets": []}"#,
    );
    let prompter = ScriptedPrompter::new([]);

    let outcome = CommitWorkflow::new(&config, &backend, &gateway, &prompter)
        .run()
        .await
        .unwrap();

    assert!(matches!(outcome, WorkflowOutcome::Committed(_)));
    assert_eq!(repo.head_message().trim_end(), "feat: add token type");

    let prompts = gateway.prompts.lock().unwrap();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("+pub struct Token;"));
    assert!(prompts[0].contains("lexer.rs"));
}

#[tokio::test]
async fn test_clean_tree_is_nothing_to_commit() {
    let repo = TestRepo::with_initial_commit();
    let backend = repo.backend();
    let config = manual_config();
    let gateway = FixedGateway::new("unused");
    let prompter = ScriptedPrompter::new([]);

    let outcome = CommitWorkflow::new(&config, &backend, &gateway, &prompter)
        .run()
        .await
        .unwrap();

    assert_eq!(outcome, WorkflowOutcome::NothingToCommit);
    assert_eq!(repo.commit_count(), 1);
}

#[tokio::test]
async fn test_declined_confirmation_keeps_staging() {
    let repo = TestRepo::with_initial_commit();
    repo.write("draft.md", "wip\n");
    let backend = repo.backend();
    let config = manual_config();
    let gateway = FixedGateway::new("unused");
    let prompter = ScriptedPrompter::new([
        Reply::Select(Prompt::Answer(2)),
        Reply::Select(Prompt::Answer(0)),
        Reply::Input(Prompt::Answer("draft notes".to_string())),
        Reply::Confirm(Prompt::Answer(false)),
    ]);

    let outcome = CommitWorkflow::new(&config, &backend, &gateway, &prompter)
        .run()
        .await
        .unwrap();

    assert_eq!(outcome, WorkflowOutcome::Cancelled);
    assert_eq!(repo.commit_count(), 1);
    // Staging is not rolled back.
    assert_eq!(get_status(&backend).unwrap().staged_count(), 1);
}

#[tokio::test]
async fn test_failing_pre_commit_hook_aborts() {
    let repo = TestRepo::with_initial_commit();
    repo.write("a.txt", "a\n");
    let backend = repo.backend();

    let mut config = manual_config();
    config.commit.ask_confirm = false;
    config.commit.ask_type = false;
    config.commit.ask_scope = false;
    config.hooks.pre_commit = "echo blocked >&2; exit 1".to_string();

    let gateway = FixedGateway::new("unused");
    let prompter =
        ScriptedPrompter::new([Reply::Input(Prompt::Answer("add a".to_string()))]);

    let err = CommitWorkflow::new(&config, &backend, &gateway, &prompter)
        .run()
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        WorkflowError::Backend(BackendError::HookFailed { hook: "pre-commit", .. })
    ));
    assert_eq!(repo.commit_count(), 1);
}

#[tokio::test]
async fn test_push_failure_keeps_commit() {
    let repo = TestRepo::with_initial_commit();
    repo.write("a.txt", "a\n");
    let backend = repo.backend();

    let mut config = manual_config();
    config.commit.ask_confirm = false;
    config.commit.ask_type = false;
    config.commit.ask_scope = false;
    config.commit.ask_push = true;

    let gateway = FixedGateway::new("unused");
    let prompter = ScriptedPrompter::new([
        Reply::Input(Prompt::Answer("add a".to_string())),
        Reply::Confirm(Prompt::Answer(true)),
    ]);

    let outcome = CommitWorkflow::new(&config, &backend, &gateway, &prompter)
        .run()
        .await
        .unwrap();

    let WorkflowOutcome::Committed(summary) = outcome else {
        panic!("expected a commit");
    };
    assert!(matches!(summary.push, PushOutcome::Failed(_)));
    assert_eq!(repo.commit_count(), 2);
    assert!(
        prompter
            .notices
            .borrow()
            .iter()
            .any(|n| n.starts_with("Push failed"))
    );
    assert!(backend.current_branch().unwrap().is_some());
}

#[tokio::test]
async fn test_manual_pick_of_non_ascii_file() {
    let repo = TestRepo::with_initial_commit();
    repo.write("café.txt", "menu\n");
    let backend = repo.backend();

    let mut config = manual_config();
    config.stage_options = stage_options(false, true);
    config.commit.ask_confirm = false;
    config.commit.ask_type = false;
    config.commit.ask_scope = false;

    let gateway = FixedGateway::new("unused");
    let prompter = ScriptedPrompter::new([
        Reply::MultiSelect(Prompt::Answer(vec![0])),
        Reply::Input(Prompt::Answer("add menu".to_string())),
    ]);

    let outcome = CommitWorkflow::new(&config, &backend, &gateway, &prompter)
        .run()
        .await
        .unwrap();

    assert!(matches!(outcome, WorkflowOutcome::Committed(_)));
    assert_eq!(repo.head_message().trim_end(), "feat: add menu");
    assert!(get_status(&backend).unwrap().is_empty());
    assert!(prompter.notices.borrow().is_empty());
}
