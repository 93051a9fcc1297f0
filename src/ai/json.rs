//! Locating a JSON object inside free-form completion text.
//!
//! Providers often wrap JSON in markdown fences or add a sentence before or
//! after it. Callers that fall back to plain-text parsing need to know
//! whether an object was present at all, so this returns `Option`.

/// Find the first JSON object in a completion.
///
/// Tries a ` ```json ` fence, then a bare fence whose body starts with `{`,
/// then every `{` in the text. Only candidates that parse as JSON are
/// returned.
pub fn find_json_object(response: &str) -> Option<String> {
    let trimmed = response.trim();

    if let Some(start) = trimmed.find("```json")
        && let Some(end) = trimmed[start + 7..].find("```")
    {
        let inner = trimmed[start + 7..start + 7 + end].trim();
        if is_json_object(inner) {
            return Some(inner.to_string());
        }
    }

    if let Some(start) = trimmed.find("```")
        && let Some(end) = trimmed[start + 3..].find("```")
    {
        let inner = trimmed[start + 3..start + 3 + end].trim();
        if inner.starts_with('{') && is_json_object(inner) {
            return Some(inner.to_string());
        }
    }

    for (start_idx, _) in trimmed.match_indices('{') {
        if let Some(candidate) = balanced_object(&trimmed[start_idx..])
            && is_json_object(candidate)
        {
            return Some(candidate.to_string());
        }
    }

    None
}

fn is_json_object(text: &str) -> bool {
    matches!(
        serde_json::from_str::<serde_json::Value>(text),
        Ok(serde_json::Value::Object(_))
    )
}

/// Slice from the leading `{` to its matching `}`, ignoring braces inside
/// string literals.
fn balanced_object(text: &str) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    for (idx, ch) in text.char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }

        match ch {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(&text[..=idx]);
                }
            }
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_json_in_markdown_fence() {
        let response = "Here you go:\n```json\n{\"type\": \"feat\"}\n```";
        assert_eq!(find_json_object(response).unwrap(), r#"{"type": "feat"}"#);
    }

    #[test]
    fn test_find_json_in_bare_fence() {
        let response = "```\n{\"description\": \"add parser\"}\n```";
        let json = find_json_object(response).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["description"], "add parser");
    }

    #[test]
    fn test_find_json_with_surrounding_text() {
        let response = r#"Sure! {"type": "fix", "scope": "ui"} Let me know."#;
        let json = find_json_object(response).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["scope"], "ui");
    }

    #[test]
    fn test_find_json_braces_inside_strings() {
        let response = r#"{"description": "handle { and } in templates"} trailing"#;
        let json = find_json_object(response).unwrap();
        assert_eq!(json, r#"{"description": "handle { and } in templates"}"#);
    }

    #[test]
    fn test_find_json_nested() {
        let response = r#"{"files": ["a.rs"], "meta": {"why": "same feature"}}"#;
        let json = find_json_object(response).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["meta"]["why"], "same feature");
    }

    #[test]
    fn test_plain_conventional_header_has_no_json() {
        assert!(find_json_object("feat(core): add parser").is_none());
    }

    #[test]
    fn test_unbalanced_braces_have_no_json() {
        assert!(find_json_object("}} {").is_none());
    }

    #[test]
    fn test_json_array_is_not_an_object() {
        assert!(find_json_object("```json\n[1, 2]\n```").is_none());
    }
}
