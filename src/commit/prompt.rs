//! Prompt construction for AI-generated commit messages and AI-assisted staging.

use std::fmt::Write as _;
use std::sync::LazyLock;

use regex_lite::Regex;

use crate::config::MessageRules;
use crate::git::RepositoryStatus;

/// Maximum length (in characters) for sanitized diff text.
pub const MAX_DIFF_SANITIZED_LENGTH: usize = 30_000;

static ANSI_ESCAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\x1b\[[0-9;?]*[ -/]*[@-~]|\x1b\][^\x07]*\x07").expect("Invalid ANSI regex")
});

/// Build the prompt that asks the model for a commit message.
///
/// The model is told which types and scopes are allowed, the description
/// limit and language, and is asked to answer with a JSON object so the
/// response can be mapped onto the manual-entry fields.
pub fn build_commit_prompt(
    diff: &str,
    status: &RepositoryStatus,
    rules: &MessageRules,
    branch: Option<&str>,
) -> String {
    let files_section = file_list(status);
    let sanitized = sanitize_diff(diff, MAX_DIFF_SANITIZED_LENGTH);
    let truncation_note = if sanitized.chars().count() >= MAX_DIFF_SANITIZED_LENGTH {
        "\n\nNote: The diff was truncated due to size. Focus on the visible changes."
    } else {
        ""
    };

    let types_section: String = rules
        .types
        .iter()
        .map(|t| {
            if t.description.is_empty() {
                format!("- {}", t.value)
            } else {
                format!("- {}: {}", t.value, t.description)
            }
        })
        .collect::<Vec<_>>()
        .join("\n");

    let scope_rule = if rules.scope.is_empty() {
        "Scope: optional. Infer it from the primary module affected, or use an empty string."
            .to_string()
    } else {
        format!(
            "Scope: one of {}, or an empty string if none fits.",
            rules.scope.join(", ")
        )
    };

    let bullet_rule = if rules.bullet_points {
        "- `bullets`: 1 to 5 short lines describing individual changes"
    } else {
        "- `bullets`: always an empty array"
    };

    let mut prompt = format!(
        r#"You are generating a Git commit message following the Conventional Commits specification.

## Changed Files
{files_section}

## Diff
```
{sanitized}
```{truncation_note}
"#
    );

    if let Some(branch) = branch {
        let _ = write!(prompt, "\n## Branch Context\nBranch: {branch}\n");
    }

    let _ = write!(
        prompt,
        r#"
## Rules
Type: choose exactly one of
{types_section}
{scope_rule}
Description: imperative mood, no period at the end, at most {max} characters.
Write the description in {language}.
{instructions}

## Output Format
Respond with ONLY a JSON object (no markdown, no explanation):
{{"type": "feat", "scope": "", "description": "short summary", "bullets": []}}
{bullet_rule}"#,
        max = rules.description.max_length,
        language = rules.language,
        instructions = rules.instructions.trim(),
    );

    prompt
}

/// Build the prompt for the AI-assisted "relevant files" staging strategy.
pub fn build_relevance_prompt(status: &RepositoryStatus) -> String {
    format!(
        r#"The working tree has these changes:
{files}

Pick the files that belong together in one focused commit (the largest coherent group).
Respond with ONLY a JSON object (no markdown, no explanation):
{{"files": ["path/one", "path/two"]}}"#,
        files = file_list(status)
    )
}

fn file_list(status: &RepositoryStatus) -> String {
    status
        .files()
        .iter()
        .map(|f| format!("- {} ({})", f.path, f.status))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Sanitize diff text for inclusion in a prompt.
///
/// Removes control characters (keeping newlines and tabs) and ANSI escape
/// sequences, then truncates to `max_chars` characters.
pub fn sanitize_diff(text: &str, max_chars: usize) -> String {
    let without_ansi = ANSI_ESCAPE.replace_all(text, "");
    without_ansi
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .take(max_chars)
        .collect()
}
