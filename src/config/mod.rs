//! Typed settings for the commit workflow.
//!
//! A `Config` is loaded and validated once per process (see [`load`]) and is
//! then passed by reference to every component. Keys mirror the
//! `git-assist.toml` file, which uses camelCase names.

pub mod load;

use serde::{Deserialize, Serialize};

use crate::ai::Provider;
use crate::error::ConfigError;

pub use load::{CONFIG_FILE_NAME, apply_env_credentials, load_config, parse_config};

/// Root configuration value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    pub ai: AiConfig,
    pub commit: CommitConfig,
    pub stage_options: StageOptions,
    pub hooks: HooksConfig,
    pub release: ReleaseConfig,
}

/// Selected provider plus one credential slot per provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    #[serde(rename = "useModel")]
    pub use_model: String,
    pub deepseek: String,
    #[serde(rename = "gpt-4o")]
    pub gpt_4o: String,
    #[serde(rename = "claude-3.7-sonnet")]
    pub claude_3_7_sonnet: String,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            use_model: Provider::Deepseek.config_key().to_string(),
            deepseek: String::new(),
            gpt_4o: String::new(),
            claude_3_7_sonnet: String::new(),
        }
    }
}

impl AiConfig {
    /// The provider named by `useModel`.
    pub fn provider(&self) -> Result<Provider, ConfigError> {
        self.use_model.parse()
    }

    pub fn credential_for(&self, provider: Provider) -> &str {
        match provider {
            Provider::Deepseek => &self.deepseek,
            Provider::OpenAi => &self.gpt_4o,
            Provider::Anthropic => &self.claude_3_7_sonnet,
        }
    }

    pub(crate) fn credential_slot(&mut self, provider: Provider) -> &mut String {
        match provider {
            Provider::Deepseek => &mut self.deepseek,
            Provider::OpenAi => &mut self.gpt_4o,
            Provider::Anthropic => &mut self.claude_3_7_sonnet,
        }
    }

    /// The selected provider and its credential.
    ///
    /// Only the selected provider's credential is required. A missing one is
    /// an error; another provider is never substituted.
    pub fn credential(&self) -> Result<(Provider, &str), ConfigError> {
        let provider = self.provider()?;
        let key = self.credential_for(provider).trim();
        if key.is_empty() {
            return Err(ConfigError::MissingCredential {
                model: provider.config_key(),
                env_var: provider.env_var(),
            });
        }
        Ok((provider, key))
    }
}

/// How the commit message is produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitMode {
    #[default]
    #[serde(alias = "aicommit")]
    Ai,
    Manual,
}

impl CommitMode {
    pub fn label(&self) -> &'static str {
        match self {
            CommitMode::Ai => "AI Commit",
            CommitMode::Manual => "Manual Commit",
        }
    }
}

/// Which interactive steps the commit workflow asks about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CommitConfig {
    pub mode: CommitMode,
    pub ask_mode: bool,
    pub ask_type: bool,
    pub ask_scope: bool,
    pub ask_stage: bool,
    pub ask_confirm: bool,
    pub ask_push: bool,
    pub message: MessageRules,
}

impl Default for CommitConfig {
    fn default() -> Self {
        Self {
            mode: CommitMode::Ai,
            ask_mode: true,
            ask_type: true,
            ask_scope: true,
            ask_stage: true,
            ask_confirm: true,
            ask_push: true,
            message: MessageRules::default(),
        }
    }
}

/// One entry of the commit-type taxonomy. Order in the config is display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitTypeOption {
    pub value: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
}

impl CommitTypeOption {
    fn new(value: &str, emoji: &str, label: &str, description: &str) -> Self {
        Self {
            value: value.to_string(),
            label: label.to_string(),
            description: description.to_string(),
            emoji: Some(emoji.to_string()),
        }
    }

    /// Display line for the type picker.
    pub fn display(&self) -> String {
        let name = if self.label.is_empty() {
            self.value.as_str()
        } else {
            self.label.as_str()
        };
        let mut line = match self.emoji.as_deref() {
            Some(emoji) if !emoji.is_empty() => format!("{emoji} {name}"),
            _ => name.to_string(),
        };
        if !self.description.is_empty() {
            line.push_str(" - ");
            line.push_str(&self.description);
        }
        line
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DescriptionRules {
    pub required: bool,
    pub max_length: usize,
}

impl Default for DescriptionRules {
    fn default() -> Self {
        Self {
            required: true,
            max_length: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmojiRules {
    pub enabled: bool,
}

impl Default for EmojiRules {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Rules the composed commit message must follow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MessageRules {
    pub scope: Vec<String>,
    #[serde(rename = "type")]
    pub types: Vec<CommitTypeOption>,
    pub description: DescriptionRules,
    pub emoji: EmojiRules,
    pub bullet_points: bool,
    pub language: String,
    pub instructions: String,
}

impl Default for MessageRules {
    fn default() -> Self {
        Self {
            scope: ["ui", "backend", "database", "infrastructure", "other"]
                .into_iter()
                .map(String::from)
                .collect(),
            types: default_commit_types(),
            description: DescriptionRules::default(),
            emoji: EmojiRules::default(),
            bullet_points: false,
            language: "english".to_string(),
            instructions: "Explain the changes you made in this commit. Be specific and concise."
                .to_string(),
        }
    }
}

impl MessageRules {
    pub fn find_type(&self, value: &str) -> Option<&CommitTypeOption> {
        self.types.iter().find(|t| t.value == value)
    }

    /// The type used when none is chosen explicitly.
    pub fn default_type(&self) -> Option<&CommitTypeOption> {
        self.types.first()
    }

    /// Emoji for `type_value`, or an empty string when emoji are disabled.
    pub fn emoji_for(&self, type_value: &str) -> String {
        if !self.emoji.enabled {
            return String::new();
        }
        self.find_type(type_value)
            .and_then(|t| t.emoji.clone())
            .unwrap_or_default()
    }
}

fn default_commit_types() -> Vec<CommitTypeOption> {
    vec![
        CommitTypeOption::new("feat", "✨", "Features", "A new feature"),
        CommitTypeOption::new("fix", "🐛", "Bug Fixes", "A bug fix"),
        CommitTypeOption::new("docs", "📝", "Documentation", "Documentation only changes"),
        CommitTypeOption::new(
            "style",
            "💄",
            "Styles",
            "Changes that don't affect the meaning of the code",
        ),
        CommitTypeOption::new(
            "refactor",
            "♻️",
            "Code Refactoring",
            "A code change that neither fixes a bug nor adds a feature",
        ),
        CommitTypeOption::new("perf", "⚡", "Performance", "A code change that improves performance"),
        CommitTypeOption::new("test", "✅", "Tests", "Adding missing tests or correcting existing tests"),
        CommitTypeOption::new("chore", "🔧", "Chores", "Other changes that don't modify src or test files"),
    ]
}

/// Which staging strategies are offered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StageOptions {
    pub enable_stage_all: bool,
    pub enable_stage_by_folder: bool,
    pub enable_stage_relevant: bool,
    pub enable_stage_manual: bool,
}

impl Default for StageOptions {
    fn default() -> Self {
        Self {
            enable_stage_all: true,
            enable_stage_by_folder: true,
            enable_stage_relevant: true,
            enable_stage_manual: true,
        }
    }
}

impl StageOptions {
    pub fn any_enabled(&self) -> bool {
        self.enable_stage_all
            || self.enable_stage_by_folder
            || self.enable_stage_relevant
            || self.enable_stage_manual
    }
}

/// Shell commands run around the commit. Empty means disabled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HooksConfig {
    pub pre_commit: String,
    pub post_commit: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Versioning {
    #[default]
    Semantic,
    Calendar,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReleaseConfig {
    pub generate_changelog: bool,
    pub versioning: Versioning,
    pub publish: String,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            generate_changelog: true,
            versioning: Versioning::Semantic,
            publish: String::new(),
        }
    }
}

impl Config {
    /// Fail fast on settings that can never work.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.ai.provider()?;

        let rules = &self.commit.message;
        if rules.types.is_empty() {
            return Err(ConfigError::InvalidRule(
                "commit.message.type must list at least one commit type".to_string(),
            ));
        }
        if let Some(blank) = rules.types.iter().find(|t| t.value.trim().is_empty()) {
            return Err(ConfigError::InvalidRule(format!(
                "commit type with label '{}' has an empty value",
                blank.label
            )));
        }
        if rules.description.max_length == 0 {
            return Err(ConfigError::InvalidRule(
                "commit.message.description.maxLength must be greater than 0".to_string(),
            ));
        }

        if self.commit.ask_stage && !self.stage_options.any_enabled() {
            return Err(ConfigError::NoStagingStrategy);
        }

        // AI is unavoidable only when the mode is fixed to ai.
        if self.commit.mode == CommitMode::Ai && !self.commit.ask_mode {
            self.ai.credential()?;
        }

        Ok(())
    }

    /// Copy with every credential masked, for display.
    pub fn redacted(&self) -> Config {
        let mut copy = self.clone();
        for provider in Provider::ALL {
            let slot = copy.ai.credential_slot(provider);
            if !slot.is_empty() {
                *slot = mask(slot);
            }
        }
        copy
    }
}

fn mask(secret: &str) -> String {
    let visible: String = secret.chars().take(3).collect();
    format!("{visible}***")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid_without_credentials() {
        // askMode is on by default, so no key is required up front.
        Config::default().validate().unwrap();
    }

    #[test]
    fn mandatory_ai_mode_requires_selected_credential() {
        let mut config = Config::default();
        config.commit.ask_mode = false;
        config.ai.use_model = "gpt-4o".to_string();
        config.ai.deepseek = "sk-unrelated".to_string();

        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingCredential { model: "gpt-4o", env_var: "OPENAI_API_KEY" }
        ));
        assert!(err.to_string().contains("gpt-4o"));
    }

    #[test]
    fn credential_is_not_borrowed_from_another_provider() {
        let ai = AiConfig {
            use_model: "claude-3.7-sonnet".to_string(),
            deepseek: "sk-deepseek".to_string(),
            gpt_4o: "sk-openai".to_string(),
            claude_3_7_sonnet: "  ".to_string(),
        };
        assert!(matches!(
            ai.credential(),
            Err(ConfigError::MissingCredential { model: "claude-3.7-sonnet", .. })
        ));
    }

    #[test]
    fn credential_returns_selected_provider() {
        let ai = AiConfig {
            use_model: "gpt-4o".to_string(),
            gpt_4o: "sk-openai".to_string(),
            ..AiConfig::default()
        };
        let (provider, key) = ai.credential().unwrap();
        assert_eq!(provider, Provider::OpenAi);
        assert_eq!(key, "sk-openai");
    }

    #[test]
    fn unknown_model_fails_validation() {
        let mut config = Config::default();
        config.ai.use_model = "gpt-5".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::UnsupportedModel(_))
        ));
    }

    #[test]
    fn empty_type_list_fails_validation() {
        let mut config = Config::default();
        config.commit.message.types.clear();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidRule(_))));
    }

    #[test]
    fn zero_max_length_fails_validation() {
        let mut config = Config::default();
        config.commit.message.description.max_length = 0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidRule(_))));
    }

    #[test]
    fn staging_prompt_needs_a_strategy() {
        let mut config = Config::default();
        config.stage_options = StageOptions {
            enable_stage_all: false,
            enable_stage_by_folder: false,
            enable_stage_relevant: false,
            enable_stage_manual: false,
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NoStagingStrategy)
        ));

        config.commit.ask_stage = false;
        config.validate().unwrap();
    }

    #[test]
    fn emoji_for_respects_enabled_flag() {
        let mut rules = MessageRules::default();
        assert_eq!(rules.emoji_for("fix"), "🐛");
        assert_eq!(rules.emoji_for("unknown"), "");
        rules.emoji.enabled = false;
        assert_eq!(rules.emoji_for("fix"), "");
    }

    #[test]
    fn redacted_masks_credentials() {
        let mut config = Config::default();
        config.ai.deepseek = "sk-secret-value".to_string();
        let redacted = config.redacted();
        assert_eq!(redacted.ai.deepseek, "sk-***");
        assert_eq!(redacted.ai.gpt_4o, "");
        assert_eq!(config.ai.deepseek, "sk-secret-value");
    }

    #[test]
    fn type_display_uses_emoji_label_and_description() {
        let rules = MessageRules::default();
        assert_eq!(
            rules.find_type("feat").unwrap().display(),
            "✨ Features - A new feature"
        );
    }
}
