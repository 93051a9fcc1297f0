//! Commit message composition.
//!
//! [`compose`] is a pure function: the same rules and answers always yield
//! the same bytes.

use crate::config::MessageRules;
use crate::error::ValidationError;

/// Everything needed to compose one commit message.
///
/// Created fresh per commit attempt from either the manual prompts or the AI
/// response, and handed to [`compose`] unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitAnswers {
    pub commit_type: String,
    /// Empty means no scope.
    pub scope: String,
    pub description: String,
    /// Empty means no emoji.
    pub emoji: String,
    pub bullet_points: Vec<String>,
}

impl CommitAnswers {
    pub fn new(commit_type: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            commit_type: commit_type.into(),
            description: description.into(),
            ..Self::default()
        }
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    pub fn with_emoji(mut self, emoji: impl Into<String>) -> Self {
        self.emoji = emoji.into();
        self
    }

    pub fn with_bullets(mut self, bullets: Vec<String>) -> Self {
        self.bullet_points = bullets;
        self
    }
}

/// Assemble `type(scope): description emoji`.
///
/// The scope is omitted when empty, the emoji when disabled or empty. When
/// `bulletPoints` is enabled, non-empty bullets follow as a body under a
/// blank line; the subject line is unaffected.
pub fn compose(rules: &MessageRules, answers: &CommitAnswers) -> String {
    let answers = translate(rules, answers);

    let mut message = answers.commit_type.trim().to_string();
    let scope = answers.scope.trim();
    if !scope.is_empty() {
        message.push('(');
        message.push_str(scope);
        message.push(')');
    }
    message.push_str(": ");
    message.push_str(answers.description.trim());

    let emoji = answers.emoji.trim();
    if rules.emoji.enabled && !emoji.is_empty() {
        message.push(' ');
        message.push_str(emoji);
    }

    if rules.bullet_points {
        let bullets: Vec<&str> = answers
            .bullet_points
            .iter()
            .map(|b| b.trim().trim_start_matches(['-', '*']).trim())
            .filter(|b| !b.is_empty())
            .collect();
        if !bullets.is_empty() {
            message.push_str("\n\n");
            message.push_str(
                &bullets
                    .iter()
                    .map(|b| format!("- {b}"))
                    .collect::<Vec<_>>()
                    .join("\n"),
            );
        }
    }

    message
}

/// Check a description against the rules. Length is counted in characters.
pub fn validate_description(rules: &MessageRules, description: &str) -> Result<(), ValidationError> {
    let description = description.trim();
    if rules.description.required && description.is_empty() {
        return Err(ValidationError::DescriptionRequired);
    }

    let actual = description.chars().count();
    let max = rules.description.max_length;
    if actual > max {
        return Err(ValidationError::DescriptionTooLong { max, actual });
    }
    Ok(())
}

/// Cut a description down to `max_chars` characters, dropping trailing whitespace.
pub fn truncate_description(description: &str, max_chars: usize) -> String {
    let trimmed = description.trim();
    if trimmed.chars().count() <= max_chars {
        return trimmed.to_string();
    }
    trimmed
        .chars()
        .take(max_chars)
        .collect::<String>()
        .trim_end()
        .to_string()
}

/// Translation hook for the natural-language fields (description, bullets).
///
/// Type, scope and emoji are never touched. Generated text is requested in
/// the configured language up front, so the built-in translator is the
/// identity.
fn translate(_rules: &MessageRules, answers: &CommitAnswers) -> CommitAnswers {
    answers.clone()
}
