//! Shared test utilities for integration tests.
//!
//! Not all functions are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::Path;

use async_trait::async_trait;
use git2::{Oid, Repository, Signature};

use git_assist::ai::{CompletionGateway, CompletionResponse};
use git_assist::config::AiConfig;
use git_assist::error::{GatewayError, PromptError};
use git_assist::git::GitCli;
use git_assist::prompt::{Prompt, Prompter};

/// A test git repository builder for integration tests.
pub struct TestRepo {
    pub dir: tempfile::TempDir,
    pub repo: Repository,
}

impl TestRepo {
    /// Create a new empty git repository in a temp directory, configured so
    /// the `git` binary can commit without global settings.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let repo = Repository::init(dir.path()).expect("Failed to init git repo");
        {
            let mut config = repo.config().expect("Failed to open repo config");
            config.set_str("user.name", "Test User").expect("Failed to set user.name");
            config
                .set_str("user.email", "test@example.com")
                .expect("Failed to set user.email");
            config
                .set_bool("commit.gpgsign", false)
                .expect("Failed to disable signing");
        }
        Self { dir, repo }
    }

    /// A repository with one commit containing `README.md`.
    pub fn with_initial_commit() -> Self {
        let test_repo = Self::new();
        test_repo.write("README.md", "# test\n");
        test_repo.commit_all("chore: initial commit");
        test_repo
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn backend(&self) -> GitCli {
        GitCli::discover(self.path()).expect("Failed to discover test repo")
    }

    /// Write a file relative to the work tree, creating parent directories.
    pub fn write(&self, relative: &str, content: &str) {
        let path = self.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(path, content).expect("Failed to write test file");
    }

    /// Stage one path through git2.
    pub fn stage(&self, relative: &str) {
        let mut index = self.repo.index().expect("Failed to get index");
        index.add_path(Path::new(relative)).expect("Failed to add file");
        index.write().expect("Failed to write index");
    }

    /// Stage everything and commit through git2. Returns the commit OID.
    pub fn commit_all(&self, message: &str) -> Oid {
        let sig = Signature::now("Test User", "test@example.com").expect("Failed to create signature");

        let mut index = self.repo.index().expect("Failed to get index");
        index
            .add_all(["*"].iter(), git2::IndexAddOption::DEFAULT, None)
            .expect("Failed to add files");
        index.write().expect("Failed to write index");
        let tree_id = index.write_tree().expect("Failed to write tree");
        let tree = self.repo.find_tree(tree_id).expect("Failed to find tree");

        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .expect("Failed to create commit")
    }

    /// Message of the commit at HEAD.
    pub fn head_message(&self) -> String {
        let commit = self
            .repo
            .head()
            .and_then(|h| h.peel_to_commit())
            .expect("Failed to read HEAD");
        commit.message().unwrap_or_default().to_string()
    }

    /// Number of commits reachable from HEAD.
    pub fn commit_count(&self) -> usize {
        let mut revwalk = self.repo.revwalk().expect("Failed to create revwalk");
        if revwalk.push_head().is_err() {
            return 0;
        }
        revwalk.count()
    }
}

/// One canned answer for [`ScriptedPrompter`].
#[derive(Debug, Clone)]
pub enum Reply {
    Select(Prompt<usize>),
    MultiSelect(Prompt<Vec<usize>>),
    Input(Prompt<String>),
    Confirm(Prompt<bool>),
}

/// Prompter that replays canned answers and panics on anything unexpected.
#[derive(Default)]
pub struct ScriptedPrompter {
    replies: RefCell<VecDeque<Reply>>,
    pub notices: RefCell<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn new(replies: impl IntoIterator<Item = Reply>) -> Self {
        Self {
            replies: RefCell::new(replies.into_iter().collect()),
            notices: RefCell::new(Vec::new()),
        }
    }

    fn next(&self, message: &str) -> Reply {
        self.replies
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected prompt: {message}"))
    }
}

impl Prompter for ScriptedPrompter {
    fn select(&self, message: &str, _: &[String], _: usize) -> Result<Prompt<usize>, PromptError> {
        match self.next(message) {
            Reply::Select(answer) => Ok(answer),
            other => panic!("expected select for '{message}', got {other:?}"),
        }
    }

    fn multi_select(
        &self,
        message: &str,
        _: &[String],
        _: &[bool],
    ) -> Result<Prompt<Vec<usize>>, PromptError> {
        match self.next(message) {
            Reply::MultiSelect(answer) => Ok(answer),
            other => panic!("expected multi-select for '{message}', got {other:?}"),
        }
    }

    fn input(&self, message: &str, _: &str) -> Result<Prompt<String>, PromptError> {
        match self.next(message) {
            Reply::Input(answer) => Ok(answer),
            other => panic!("expected input for '{message}', got {other:?}"),
        }
    }

    fn confirm(&self, message: &str, _: bool) -> Result<Prompt<bool>, PromptError> {
        match self.next(message) {
            Reply::Confirm(answer) => Ok(answer),
            other => panic!("expected confirm for '{message}', got {other:?}"),
        }
    }

    fn notify(&self, message: &str) {
        self.notices.borrow_mut().push(message.to_string());
    }
}

/// Gateway that answers every prompt with the same text.
pub struct FixedGateway {
    pub content: String,
    pub prompts: std::sync::Mutex<Vec<String>>,
}

impl FixedGateway {
    pub fn new(content: &str) -> Self {
        Self {
            content: content.to_string(),
            prompts: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl CompletionGateway for FixedGateway {
    async fn generate(&self, prompt: &str, _ai: &AiConfig) -> Result<CompletionResponse, GatewayError> {
        self.prompts
            .lock()
            .expect("prompt log poisoned")
            .push(prompt.to_string());
        Ok(CompletionResponse {
            content: self.content.clone(),
            usage: None,
        })
    }
}
