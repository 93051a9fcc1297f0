//! Working-tree status from `git status --porcelain`.
//!
//! All display and staging logic consumes [`StatusCode`]; the raw two-letter
//! porcelain codes are only looked at in [`parse_porcelain`].

use std::collections::BTreeSet;
use std::fmt;

use crate::error::BackendError;
use crate::git::backend::RepositoryBackend;

/// Kind of change recorded for a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    Modified,
    Added,
    Deleted,
    Renamed,
    Copied,
    UpdatedUnmerged,
    Untracked,
    Unknown,
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            StatusCode::Modified => "modified",
            StatusCode::Added => "added",
            StatusCode::Deleted => "deleted",
            StatusCode::Renamed => "renamed",
            StatusCode::Copied => "copied",
            StatusCode::UpdatedUnmerged => "updated but unmerged",
            StatusCode::Untracked => "untracked",
            StatusCode::Unknown => "unknown",
        };
        f.pad(text)
    }
}

/// One changed path in the working tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    pub path: String,
    pub status: StatusCode,
    /// The index column is set (change is staged).
    pub staged: bool,
    /// The work-tree column is set (change is not yet staged).
    pub unstaged: bool,
}

impl FileChange {
    /// Convenience constructor for a change that only exists in the work tree.
    pub fn new(path: impl Into<String>, status: StatusCode) -> Self {
        let untracked = status == StatusCode::Untracked;
        Self {
            path: path.into(),
            status,
            staged: false,
            unstaged: !untracked,
        }
    }

    /// First path component when the change lives inside a directory.
    pub fn top_level_directory(&self) -> Option<&str> {
        self.path
            .split_once('/')
            .map(|(dir, _)| dir)
            .filter(|dir| !dir.is_empty())
    }
}

/// Ordered snapshot of working-tree changes.
///
/// Counts are derived from the file list on demand and never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositoryStatus {
    files: Vec<FileChange>,
}

impl RepositoryStatus {
    pub fn new(files: Vec<FileChange>) -> Self {
        Self { files }
    }

    pub fn files(&self) -> &[FileChange] {
        &self.files
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn staged_count(&self) -> usize {
        self.files.iter().filter(|f| f.staged).count()
    }

    pub fn unstaged_count(&self) -> usize {
        self.files.iter().filter(|f| f.unstaged).count()
    }

    pub fn untracked_count(&self) -> usize {
        self.files
            .iter()
            .filter(|f| f.status == StatusCode::Untracked)
            .count()
    }

    pub fn contains_path(&self, path: &str) -> bool {
        self.files.iter().any(|f| f.path == path)
    }

    /// Sorted, de-duplicated top-level directories that contain changes.
    pub fn top_level_directories(&self) -> Vec<String> {
        self.files
            .iter()
            .filter_map(FileChange::top_level_directory)
            .map(String::from)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// Query the backend and parse its porcelain output.
///
/// A clean tree yields an empty status, not an error.
pub fn get_status(backend: &dyn RepositoryBackend) -> Result<RepositoryStatus, BackendError> {
    let output = backend.status()?;
    Ok(parse_porcelain(&output))
}

/// Parse porcelain v1 output into a [`RepositoryStatus`].
pub fn parse_porcelain(output: &str) -> RepositoryStatus {
    RepositoryStatus::new(output.lines().filter_map(parse_line).collect())
}

fn parse_line(line: &str) -> Option<FileChange> {
    let code = line.get(..2)?;
    let raw_path = line.get(3..)?.trim_end();
    if raw_path.is_empty() {
        return None;
    }

    let mut columns = code.chars();
    let index = columns.next()?;
    let worktree = columns.next()?;
    let status = classify(code);

    // "old -> new": the new path is what gets staged.
    let path = match raw_path.split_once(" -> ") {
        Some((_, new)) if matches!(status, StatusCode::Renamed | StatusCode::Copied) => new,
        _ => raw_path,
    };

    let untracked = status == StatusCode::Untracked;
    Some(FileChange {
        path: unquote(path),
        status,
        staged: !untracked && is_set(index),
        unstaged: !untracked && is_set(worktree),
    })
}

fn classify(code: &str) -> StatusCode {
    if matches!(code, "DD" | "AU" | "UD" | "UA" | "DU" | "AA" | "UU") {
        return StatusCode::UpdatedUnmerged;
    }

    let trimmed = code.trim();
    if trimmed == "??" {
        return StatusCode::Untracked;
    }

    match trimmed.chars().next() {
        Some('M') | Some('T') => StatusCode::Modified,
        Some('A') => StatusCode::Added,
        Some('D') => StatusCode::Deleted,
        Some('R') => StatusCode::Renamed,
        Some('C') => StatusCode::Copied,
        Some('U') => StatusCode::UpdatedUnmerged,
        _ => StatusCode::Unknown,
    }
}

fn is_set(column: char) -> bool {
    !matches!(column, ' ' | '?' | '!')
}

/// Undo git's C-style path quoting (`"a\tb"`, `"caf\303\251"`).
/// Unquoted paths are returned as-is.
fn unquote(path: &str) -> String {
    let Some(inner) = path.strip_prefix('"').and_then(|p| p.strip_suffix('"')) else {
        return path.to_string();
    };

    let mut bytes = Vec::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            let mut buf = [0u8; 4];
            bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            continue;
        }
        match chars.next() {
            Some('n') => bytes.push(b'\n'),
            Some('t') => bytes.push(b'\t'),
            Some('r') => bytes.push(b'\r'),
            Some('a') => bytes.push(0x07),
            Some('b') => bytes.push(0x08),
            Some('f') => bytes.push(0x0c),
            Some('v') => bytes.push(0x0b),
            Some(d @ '0'..='7') => {
                let mut value = d.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match chars.peek().and_then(|c| c.to_digit(8)) {
                        Some(digit) => {
                            value = value * 8 + digit;
                            chars.next();
                        }
                        None => break,
                    }
                }
                bytes.push(value as u8);
            }
            Some(other) => {
                let mut buf = [0u8; 4];
                bytes.extend_from_slice(other.encode_utf8(&mut buf).as_bytes());
            }
            None => bytes.push(b'\\'),
        }
    }
    String::from_utf8_lossy(&bytes).into_owned()
}
