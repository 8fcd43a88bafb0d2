use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::i18n::Language;

const BACKEND_URL_VAR: &str = "KRISHISETU_BACKEND_URL";
const FINANCE_URL_VAR: &str = "KRISHISETU_FINANCE_URL";

fn default_lookup_url() -> String {
    "http://ip-api.com/json".to_string()
}

fn default_lookup_timeout() -> u64 {
    20
}

fn default_max_age() -> u64 {
    10
}

fn default_locale() -> String {
    "en-IN".to_string()
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub location: LocationConfig,
    #[serde(default)]
    pub voice: VoiceConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

/// Base URLs of the remote services. Neither has a default: a missing URL
/// stops the application when the client that needs it is built.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BackendConfig {
    pub base_url: Option<String>,
    pub finance_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub min_width: u32,
    pub min_height: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LocationConfig {
    #[serde(default = "default_lookup_url")]
    pub lookup_url: String,
    #[serde(default = "default_lookup_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_age")]
    pub max_age_secs: u64,
    /// Fixed coordinates; when both are set no lookup is made.
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VoiceConfig {
    #[serde(default = "default_locale")]
    pub locale: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UiConfig {
    #[serde(default)]
    pub language: Language,
}

impl Default for WindowConfig {
    fn default() -> Self {
        WindowConfig {
            width: 960,
            height: 720,
            min_width: 650,
            min_height: 480,
        }
    }
}

impl Default for LocationConfig {
    fn default() -> Self {
        LocationConfig {
            lookup_url: default_lookup_url(),
            timeout_secs: default_lookup_timeout(),
            max_age_secs: default_max_age(),
            latitude: None,
            longitude: None,
        }
    }
}

impl Default for VoiceConfig {
    fn default() -> Self {
        VoiceConfig {
            locale: default_locale(),
        }
    }
}

impl Config {
    pub fn load() -> Self {
        let config_path = Self::get_config_path();

        let mut config = if config_path.exists() {
            match fs::read_to_string(&config_path) {
                Ok(contents) => Self::parse(&contents).unwrap_or_else(|e| {
                    tracing::warn!(path = %config_path.display(), error = %e, "invalid config.toml, using defaults");
                    Config::default()
                }),
                Err(e) => {
                    tracing::warn!(path = %config_path.display(), error = %e, "could not read config.toml, using defaults");
                    Config::default()
                }
            }
        } else {
            if let Some(parent) = config_path.parent() {
                let _ = fs::create_dir_all(parent);
            }
            Config::default()
        };

        if let Err(e) = dotenvy::dotenv() {
            tracing::debug!(error = %e, "no .env file loaded");
        }
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Environment values win over the file; empty values are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(url) = non_empty(BACKEND_URL_VAR) {
            self.backend.base_url = Some(url);
        }
        if let Some(url) = non_empty(FINANCE_URL_VAR) {
            self.backend.finance_url = Some(url);
        }
    }

    pub fn get_config_path() -> PathBuf {
        Self::get_config_dir().join("config.toml")
    }

    pub fn get_config_dir() -> PathBuf {
        if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home).join(".config/krishisetu")
        } else {
            PathBuf::from(".")
        }
    }
}
