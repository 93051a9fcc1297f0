//! Mapping a model completion onto [`CommitAnswers`].
//!
//! Responses are read as a JSON object first, then as a conventional commit
//! header (`type(scope): description`), then as plain text. Fields the
//! response does not supply fall back to the configuration: the first
//! declared commit type, no scope, the type's emoji.

use std::sync::LazyLock;

use regex_lite::Regex;
use serde::Deserialize;
use tracing::debug;

use crate::ai::find_json_object;
use crate::commit::message::{CommitAnswers, truncate_description};
use crate::config::MessageRules;

static CONVENTIONAL_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\w+)(?:\(([^)]*)\))?!?\s*:\s*(.+)$").expect("Invalid header regex")
});

/// JSON shape requested from the model. Every field is optional because
/// models do not reliably follow the contract.
#[derive(Debug, Default, Deserialize)]
struct CompletionFields {
    #[serde(rename = "type")]
    commit_type: Option<String>,
    scope: Option<String>,
    description: Option<String>,
    /// Some models answer with a full subject line instead.
    subject: Option<String>,
    #[serde(default)]
    bullets: Vec<String>,
}

/// Fields recovered from the completion before rules are applied.
#[derive(Debug, Default, PartialEq, Eq)]
struct RawAnswers {
    commit_type: Option<String>,
    scope: Option<String>,
    description: String,
    bullets: Vec<String>,
}

/// Interpret `content` under `rules`.
///
/// The description is truncated to `maxLength` characters. It may come back
/// empty; whether that is acceptable is the caller's decision.
pub fn answers_from_completion(content: &str, rules: &MessageRules) -> CommitAnswers {
    let raw = from_json(content)
        .or_else(|| from_header(content))
        .unwrap_or_else(|| from_plain_text(content));
    debug!("Parsed completion: {:?}", raw);
    apply_rules(raw, rules)
}

fn from_json(content: &str) -> Option<RawAnswers> {
    let json = find_json_object(content)?;
    let fields: CompletionFields = match serde_json::from_str(&json) {
        Ok(fields) => fields,
        Err(e) => {
            debug!("Completion JSON did not match the expected shape: {}", e);
            return None;
        }
    };

    let mut raw = match fields.description.filter(|d| !d.trim().is_empty()) {
        Some(description) => RawAnswers {
            description,
            ..RawAnswers::default()
        },
        None => {
            let subject = fields.subject.filter(|s| !s.trim().is_empty())?;
            from_header(&subject).unwrap_or_else(|| from_plain_text(&subject))
        }
    };

    if fields.commit_type.is_some() {
        raw.commit_type = fields.commit_type;
    }
    if fields.scope.is_some() {
        raw.scope = fields.scope;
    }
    raw.bullets = fields.bullets;
    Some(raw)
}

fn from_header(content: &str) -> Option<RawAnswers> {
    let mut lines = content.lines().map(clean_line).filter(|l| !l.is_empty());
    let first = lines.next()?;
    let caps = CONVENTIONAL_HEADER.captures(&first)?;

    Some(RawAnswers {
        commit_type: caps.get(1).map(|m| m.as_str().to_string()),
        scope: caps.get(2).map(|m| m.as_str().to_string()),
        description: caps.get(3).map(|m| m.as_str().to_string()).unwrap_or_default(),
        bullets: bullet_lines(lines),
    })
}

fn from_plain_text(content: &str) -> RawAnswers {
    let mut lines = content.lines().map(clean_line).filter(|l| !l.is_empty());
    let description = lines.next().unwrap_or_default();
    RawAnswers {
        description,
        bullets: bullet_lines(lines),
        ..RawAnswers::default()
    }
}

fn bullet_lines(lines: impl Iterator<Item = String>) -> Vec<String> {
    lines
        .filter_map(|l| {
            l.strip_prefix("- ")
                .or_else(|| l.strip_prefix("* "))
                .map(|b| b.trim().to_string())
        })
        .filter(|b| !b.is_empty())
        .collect()
}

/// Strip decoration models like to add around a single line.
fn clean_line(line: &str) -> String {
    line.trim()
        .trim_matches(|c| c == '`' || c == '"' || c == '\'')
        .trim()
        .to_string()
}

fn apply_rules(raw: RawAnswers, rules: &MessageRules) -> CommitAnswers {
    let default_type = rules
        .default_type()
        .map(|t| t.value.clone())
        .unwrap_or_default();
    let commit_type = raw
        .commit_type
        .map(|t| t.trim().to_lowercase())
        .filter(|t| rules.find_type(t).is_some())
        .unwrap_or(default_type);

    let scope = raw
        .scope
        .map(|s| single_line(&s))
        .filter(|s| !s.eq_ignore_ascii_case("none"))
        .filter(|s| rules.scope.is_empty() || rules.scope.iter().any(|allowed| allowed == s))
        .unwrap_or_default();

    // The subject is a single line whatever the model sent.
    let description = truncate_description(
        single_line(&raw.description).trim_end_matches('.'),
        rules.description.max_length,
    );

    let bullet_points = if rules.bullet_points {
        raw.bullets
            .iter()
            .map(|b| single_line(b))
            .filter(|b| !b.is_empty())
            .collect()
    } else {
        Vec::new()
    };

    CommitAnswers {
        emoji: rules.emoji_for(&commit_type),
        commit_type,
        scope,
        description,
        bullet_points,
    }
}

/// Collapse every run of whitespace, line breaks included, into one space.
fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
