//! Locating, parsing and finalizing the configuration file.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::ai::Provider;
use crate::config::Config;
use crate::error::ConfigError;

/// File name looked up in the repository root.
pub const CONFIG_FILE_NAME: &str = "git-assist.toml";

/// Load, complete and validate the configuration.
///
/// Lookup order: `explicit` (must exist), `<repo_root>/git-assist.toml`,
/// `<user config dir>/git-assist/config.toml`, then built-in defaults.
/// Empty credentials are filled from the provider environment variables.
pub fn load_config(explicit: Option<&Path>, repo_root: Option<&Path>) -> Result<Config, ConfigError> {
    let mut config = match resolve_path(explicit, repo_root) {
        Some(path) => {
            debug!("Loading config from {}", path.display());
            let content = fs::read_to_string(&path).map_err(|source| ConfigError::ReadFailed {
                path: path.clone(),
                source,
            })?;
            parse_config(&content, &path)?
        }
        None => {
            debug!("No config file found, using defaults");
            Config::default()
        }
    };

    apply_env_credentials(&mut config);
    config.validate()?;
    Ok(config)
}

/// Parse TOML content. `origin` is only used in error messages.
pub fn parse_config(content: &str, origin: &Path) -> Result<Config, ConfigError> {
    toml::from_str(content).map_err(|source| ConfigError::ParseFailed {
        path: origin.to_path_buf(),
        source,
    })
}

/// Fill empty credential slots from `DEEPSEEK_API_KEY`, `OPENAI_API_KEY`
/// and `ANTHROPIC_API_KEY`.
pub fn apply_env_credentials(config: &mut Config) {
    for provider in Provider::ALL {
        let slot = config.ai.credential_slot(provider);
        if !slot.trim().is_empty() {
            continue;
        }
        if let Ok(value) = env::var(provider.env_var())
            && !value.trim().is_empty()
        {
            debug!("Using {} for {} credential", provider.env_var(), provider);
            *slot = value.trim().to_string();
        }
    }
}

fn resolve_path(explicit: Option<&Path>, repo_root: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        // Explicit paths are read even when missing so the error names them.
        return Some(path.to_path_buf());
    }

    let repo_candidate = repo_root.map(|root| root.join(CONFIG_FILE_NAME));
    let user_candidate = dirs::config_dir().map(|dir| dir.join("git-assist").join("config.toml"));

    [repo_candidate, user_candidate]
        .into_iter()
        .flatten()
        .find(|path| path.is_file())
}
