use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::inference::RuleSet;
use crate::layout::LayoutConfig;
use crate::{Error, Result};

pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Environment variable that overrides the configured bearer token.
pub const TOKEN_ENV: &str = "TASKDAG_TOKEN";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_url: String,
    pub token: Option<String>,
    pub project_id: Option<i64>,
    pub layout: LayoutConfig,
    pub rules: RuleSet,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token: None,
            project_id: None,
            layout: LayoutConfig::default(),
            rules: RuleSet::default(),
        }
    }
}

impl Config {
    pub fn taskdag_dir() -> Result<PathBuf> {
        Ok(dirs::home_dir().ok_or(Error::NoHomeDir)?.join(".taskdag"))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::taskdag_dir()?.join("taskdag.toml"))
    }

    /// Load from the default location, then apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.apply_env();
        Ok(config)
    }

    /// Load from `path`; a missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "Config::load");
        if !path.exists() {
            debug!("Config file not found, using defaults");
            return Ok(Self::default());
        }
        let config: Self = toml::from_str(&fs::read_to_string(path)?)?;
        debug!(
            api_url = %config.api_url,
            project_id = ?config.project_id,
            has_token = config.token.is_some(),
            "Config loaded"
        );
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                debug!(dir = %dir.display(), "Creating config directory");
                fs::create_dir_all(dir)?;
            }
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        debug!(path = %path.display(), "Config saved");
        Ok(())
    }

    fn apply_env(&mut self) {
        if let Ok(token) = std::env::var(TOKEN_ENV) {
            if !token.trim().is_empty() {
                self.token = Some(token.trim().to_string());
            }
        }
    }

    /// Project from the CLI, else the configured default.
    ///
    /// # Errors
    /// Returns `Error::Validation` when neither is set.
    pub fn resolve_project(&self, cli_project: Option<i64>) -> Result<i64> {
        cli_project.or(self.project_id).ok_or_else(|| {
            Error::Validation("no project given and no default project_id configured".to_string())
        })
    }
}
