//! Repository access: the `git` CLI backend and porcelain status parsing.

pub mod backend;
pub mod status;

pub use backend::{GitCli, HookKind, RepositoryBackend, check_git_installed};
pub use status::{FileChange, RepositoryStatus, StatusCode, get_status, parse_porcelain};
