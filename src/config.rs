use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_API_URL: &str = "https://api-free.deepl.com/v2/translate";
pub const API_KEY_ENV: &str = "DEEPL_API_KEY";

/// Which sentence unit wins when the clicked word occurs in several.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SentencePolicy {
    #[default]
    FirstOccurrence,
    NearestClickedSegment,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Config {
    pub source_lang: String,
    pub target_lang: String,
    pub deepl_api_key: Option<String>,
    pub api_url: String,
    pub request_timeout_secs: u64,
    pub sentence_policy: SentencePolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_lang: "SV".to_string(),
            target_lang: "EN".to_string(),
            deepl_api_key: None,
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout_secs: 10,
            sentence_policy: SentencePolicy::FirstOccurrence,
        }
    }
}

impl Config {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn source_is_auto(&self) -> bool {
        self.source_lang.eq_ignore_ascii_case("auto")
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "request_timeout_secs",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.target_lang.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "target_lang",
                reason: "must not be empty".to_string(),
            });
        }
        if self.source_lang.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "source_lang",
                reason: "must not be empty (use \"auto\" to detect)".to_string(),
            });
        }
        Ok(self)
    }
}

pub fn parse_config(contents: &str, origin: &Path) -> Result<Config, ConfigError> {
    let config = toml::from_str::<Config>(contents).map_err(|source| ConfigError::Parse {
        path: origin.to_path_buf(),
        source,
    })?;
    config.validate()
}

/// Loads settings from `file_path`. A missing file is not an error: the
/// defaults apply. The API key from the environment wins over the file.
pub fn load_config_from_file(file_path: &Path) -> Result<Config, ConfigError> {
    let mut config = match fs::read_to_string(file_path) {
        Ok(contents) => parse_config(&contents, file_path)?,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::info!("{} not found, using default settings", file_path.display());
            Config::default()
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: file_path.to_path_buf(),
                source,
            })
        }
    };

    if let Ok(key) = std::env::var(API_KEY_ENV) {
        if !key.trim().is_empty() {
            config.deepl_api_key = Some(key.trim().to_string());
        }
    }
    Ok(config)
}
