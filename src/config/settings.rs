//! Configuration settings for luach.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub llm: LlmConfig,
    pub calendar: CalendarConfig,
    pub search: SearchConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm: LlmConfig::default(),
            calendar: CalendarConfig::default(),
            search: SearchConfig::default(),
        }
    }
}

/// Completion service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    /// API key; falls back to the `OPENROUTER_API_KEY` environment variable.
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://openrouter.ai/api/v1".to_string(),
            model: "meta-llama/llama-4-scout:free".to_string(),
            api_key: None,
            timeout_secs: 60,
        }
    }
}

/// Calendar conversion service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    pub converter_url: String,
    pub events_url: String,
    /// Language of transliteration and labels in service responses.
    pub lang: String,
    pub timeout_secs: u64,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            converter_url: "https://www.hebcal.com/converter".to_string(),
            events_url: "https://www.hebcal.com/hebcal".to_string(),
            lang: "ru".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Text-retrieval service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    /// How many top search hits are fetched as grounding context.
    pub context_hits: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.sefaria.org/api".to_string(),
            timeout_secs: 15,
            context_hits: 3,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::ReadFile)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from default locations or use defaults.
    pub fn load() -> Result<Self> {
        let config_paths = [
            PathBuf::from("config.toml"),
            PathBuf::from("luach.toml"),
            dirs::config_dir()
                .map(|p| p.join("luach/config.toml"))
                .unwrap_or_default(),
            dirs::home_dir()
                .map(|p| p.join(".luach/config.toml"))
                .unwrap_or_default(),
        ];

        for path in &config_paths {
            if path.as_os_str().is_empty() {
                continue;
            }
            if path.exists() {
                return Self::from_file(path);
            }
        }

        Ok(Self::default())
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.llm.base_url.is_empty() {
            return Err(ConfigError::MissingField("llm.base_url".to_string()).into());
        }
        if self.llm.model.is_empty() {
            return Err(ConfigError::MissingField("llm.model".to_string()).into());
        }
        if self.calendar.converter_url.is_empty() {
            return Err(ConfigError::MissingField("calendar.converter_url".to_string()).into());
        }
        if self.calendar.events_url.is_empty() {
            return Err(ConfigError::MissingField("calendar.events_url".to_string()).into());
        }
        if self.search.base_url.is_empty() {
            return Err(ConfigError::MissingField("search.base_url".to_string()).into());
        }
        if self.llm.timeout_secs == 0
            || self.calendar.timeout_secs == 0
            || self.search.timeout_secs == 0
        {
            return Err(ConfigError::Invalid("timeouts must be non-zero".to_string()).into());
        }
        if self.search.context_hits == 0 {
            return Err(ConfigError::Invalid("search.context_hits must be positive".to_string()).into());
        }
        Ok(())
    }
}
