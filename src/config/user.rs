use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{GocreteError, Result};

/// User-level configuration loaded from `~/.config/gocrete/config.toml`.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct UserConfig {
    /// Fallback capability choices for flags omitted on the command line.
    #[serde(default)]
    pub defaults: Defaults,

    #[serde(default)]
    pub toolchain: ToolchainConfig,

    #[serde(default)]
    pub templates: TemplatesConfig,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Defaults {
    pub router: Option<String>,
    pub db: Option<String>,
    pub openapi: Option<String>,
    pub migrations: Option<String>,
    pub docker: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolchainConfig {
    /// Go binary used for post-generation steps.
    #[serde(default = "default_go_binary")]
    pub go: String,

    #[serde(default)]
    pub skip_post_steps: bool,
}

fn default_go_binary() -> String {
    "go".to_string()
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            go: default_go_binary(),
            skip_post_steps: false,
        }
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct TemplatesConfig {
    /// On-disk template store used instead of the embedded bundles.
    pub dir: Option<PathBuf>,
}

/// Get the path to the user config file.
fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("gocrete").join("config.toml"))
}

/// Load user configuration from the platform config directory.
///
/// Returns `Ok(None)` if the config file does not exist.
/// Returns `Err` if the file exists but cannot be read or parsed.
pub fn load_user_config() -> Result<Option<UserConfig>> {
    match config_path() {
        Some(path) => load_user_config_from(&path),
        None => Ok(None),
    }
}

pub fn load_user_config_from(path: &Path) -> Result<Option<UserConfig>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path).map_err(|e| GocreteError::Io {
        context: format!("reading user config {}", path.display()),
        source: e,
    })?;

    let config: UserConfig = toml::from_str(&content).map_err(|e| GocreteError::ConfigParse {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(Some(config))
}
