//! Repository backend: the `git` binary.
//!
//! Mutations shell out to the system `git` so the user's config, hooks,
//! credential store and SSH agent apply exactly as on the command line.
//! Each call either fully succeeds or returns a [`BackendError`] carrying the
//! operation name and git's stderr.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use git2::{ErrorCode, Repository};
use tracing::debug;

use crate::error::BackendError;

/// Which configured hook is being run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookKind {
    PreCommit,
    PostCommit,
}

impl HookKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            HookKind::PreCommit => "pre-commit",
            HookKind::PostCommit => "post-commit",
        }
    }
}

/// Operations the commit workflow needs from version control.
#[cfg_attr(test, mockall::automock)]
pub trait RepositoryBackend {
    /// Porcelain v1 status text.
    fn status(&self) -> Result<String, BackendError>;

    /// Stage the given pathspecs.
    fn stage(&self, paths: &[String]) -> Result<(), BackendError>;

    fn commit(&self, message: &str) -> Result<(), BackendError>;

    fn push(&self) -> Result<(), BackendError>;

    /// Unified diff of staged (`true`) or unstaged (`false`) changes.
    fn diff(&self, staged: bool) -> Result<String, BackendError>;

    /// Current branch name; `None` on a detached or unborn HEAD.
    fn current_branch(&self) -> Result<Option<String>, BackendError>;

    /// Run a configured shell hook in the work tree.
    fn run_hook(&self, kind: HookKind, command: &str) -> Result<(), BackendError>;
}

/// Check that the `git` executable is reachable.
pub fn check_git_installed() -> Result<(), BackendError> {
    which::which("git")
        .map(|_| ())
        .map_err(|_| BackendError::GitNotInstalled)
}

/// Backend that runs `git` in a work tree.
#[derive(Debug, Clone)]
pub struct GitCli {
    workdir: PathBuf,
}

impl GitCli {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
        }
    }

    /// Find the enclosing repository of `start` and use its work tree.
    pub fn discover(start: &Path) -> Result<Self, BackendError> {
        let repo = Repository::discover(start).map_err(BackendError::NotARepository)?;
        let workdir = repo.workdir().ok_or(BackendError::BareRepository)?;
        Ok(Self::new(workdir))
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Run a git command and return its stdout, untrimmed.
    fn run_git(&self, args: &[&str], operation: &str) -> Result<String, BackendError> {
        debug!("git {}", args.join(" "));
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.workdir)
            .output()
            .map_err(|source| BackendError::SpawnFailed {
                operation: operation.to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(BackendError::CommandFailed {
                operation: operation.to_string(),
                stderr: failure_text(&output),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl RepositoryBackend for GitCli {
    fn status(&self) -> Result<String, BackendError> {
        self.run_git(&["-c", "core.quotePath=false", "status", "--porcelain"], "status")
    }

    fn stage(&self, paths: &[String]) -> Result<(), BackendError> {
        let mut args = vec!["add", "--"];
        args.extend(paths.iter().map(String::as_str));
        self.run_git(&args, "add").map(|_| ())
    }

    fn commit(&self, message: &str) -> Result<(), BackendError> {
        self.run_git(&["commit", "-m", message], "commit").map(|_| ())
    }

    fn push(&self) -> Result<(), BackendError> {
        self.run_git(&["push"], "push").map(|_| ())
    }

    fn diff(&self, staged: bool) -> Result<String, BackendError> {
        if staged {
            self.run_git(&["diff", "--cached"], "diff")
        } else {
            self.run_git(&["diff"], "diff")
        }
    }

    fn current_branch(&self) -> Result<Option<String>, BackendError> {
        let repo = Repository::open(&self.workdir).map_err(BackendError::NotARepository)?;
        let head = match repo.head() {
            Ok(head) => head,
            Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
                return Ok(None);
            }
            Err(e) => return Err(BackendError::BranchLookup(e)),
        };

        if !head.is_branch() {
            return Ok(None);
        }
        Ok(head.shorthand().map(String::from))
    }

    fn run_hook(&self, kind: HookKind, command: &str) -> Result<(), BackendError> {
        debug!("Running {} hook: {}", kind.as_str(), command);
        let output = shell(command)
            .current_dir(&self.workdir)
            .output()
            .map_err(|source| BackendError::SpawnFailed {
                operation: format!("{} hook", kind.as_str()),
                source,
            })?;

        if !output.status.success() {
            return Err(BackendError::HookFailed {
                hook: kind.as_str(),
                command: command.to_string(),
                stderr: failure_text(&output),
            });
        }
        Ok(())
    }
}

#[cfg(windows)]
fn shell(command: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.args(["/C", command]);
    cmd
}

#[cfg(not(windows))]
fn shell(command: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.args(["-c", command]);
    cmd
}

/// stderr, or stdout when stderr is empty (git prints some failures there).
fn failure_text(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    if !stderr.is_empty() {
        return stderr;
    }
    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if stdout.is_empty() {
        match output.status.code() {
            Some(code) => format!("exited with code {code}"),
            None => "terminated by signal".to_string(),
        }
    } else {
        stdout
    }
}
