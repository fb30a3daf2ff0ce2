//! Application configuration.
//!
//! Loaded from `~/.config/parley/config.toml` (or `$PARLEY_CONFIG`), then
//! overlaid with environment variables. Every field has a default, so a
//! missing file is not an error.

use std::fs;
use std::path::{Path, PathBuf};

use parley_core::ParleyError;
use parley_core::locale::Language;
use serde::Deserialize;

use crate::paths::ParleyPaths;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-lite";
pub const DEFAULT_PHRASE_TIME_LIMIT_SECS: u64 = 10;

pub const ENV_CONFIG_PATH: &str = "PARLEY_CONFIG";
pub const ENV_API_KEY: &str = "GEMINI_API_KEY";
pub const ENV_MODEL: &str = "PARLEY_MODEL";
pub const ENV_SPEECH_API_KEY: &str = "GOOGLE_SPEECH_API_KEY";

/// Root of `config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub model: String,
    /// Fallback credential; `GEMINI_API_KEY` wins when set.
    pub api_key: Option<String>,
    /// Preselected UI language; skips the language prompt.
    pub language: Option<Language>,
    pub voice: VoiceConfig,
    pub log: LogConfig,
    /// File the values were read from; `None` when running on defaults.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            language: None,
            voice: VoiceConfig::default(),
            log: LogConfig::default(),
            source: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    pub phrase_time_limit_secs: u64,
    /// ALSA capture device passed to `arecord -D`.
    pub device: Option<String>,
    pub speech_api_key: Option<String>,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            phrase_time_limit_secs: DEFAULT_PHRASE_TIME_LIMIT_SECS,
            device: None,
            speech_api_key: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Loads the configuration file and applies environment overrides.
    pub fn load() -> Result<Self, ParleyError> {
        let path = config_path()?;
        let config = Self::load_from(&path)?;
        Ok(config.with_overrides(|key| std::env::var(key).ok()))
    }

    /// Parses `path`. A missing file yields the defaults.
    ///
    /// Runs before the log subscriber exists, so it records `source` instead
    /// of logging; see [`AppConfig::describe_source`].
    pub fn load_from(path: &Path) -> Result<Self, ParleyError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| {
            ParleyError::config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let mut config: Self = toml::from_str(&content).map_err(|e| {
            ParleyError::config(format!("Failed to parse {}: {}", path.display(), e))
        })?;
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    /// Logs where the configuration came from. Call once logging is up.
    pub fn describe_source(&self) {
        match &self.source {
            Some(path) => tracing::info!("[Config] Loaded {}", path.display()),
            None => tracing::debug!("[Config] No config file, using defaults"),
        }
    }

    /// Overlays values from `lookup`; empty values are treated as unset.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = value(ENV_API_KEY) {
            self.api_key = Some(key);
        }
        if let Some(model) = value(ENV_MODEL) {
            self.model = model;
        }
        if let Some(key) = value(ENV_SPEECH_API_KEY) {
            self.voice.speech_api_key = Some(key);
        }
        self
    }

    /// The Gemini credential, if one is configured.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    /// The speech recognition credential, if one is configured.
    pub fn speech_api_key(&self) -> Option<&str> {
        self.voice
            .speech_api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

fn config_path() -> Result<PathBuf, ParleyError> {
    match std::env::var(ENV_CONFIG_PATH) {
        Ok(path) if !path.trim().is_empty() => Ok(PathBuf::from(path)),
        _ => ParleyPaths::config_file(),
    }
}
