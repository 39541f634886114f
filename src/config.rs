// ABOUTME: Loads TOML configuration for the question source and the countdown timer.
// ABOUTME: Provides defaults for every field so a missing or empty config file is valid.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub timer: TimerConfig,
}

/// Which question source to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SourceProvider {
    #[default]
    Http,
    File,
}

/// Holds settings for all sources; `provider` selects which one is active.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default)]
    pub provider: SourceProvider,
    #[serde(default)]
    pub http: HttpSourceConfig,
    #[serde(default)]
    pub file: FileSourceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpSourceConfig {
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileSourceConfig {
    #[serde(default)]
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(default = "default_seconds_per_question")]
    pub seconds_per_question: u32,
    #[serde(default = "default_tick_millis")]
    pub tick_millis: u64,
}

fn default_url() -> String {
    "http://localhost:9000/questions".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_seconds_per_question() -> u32 {
    quizclock_core::SECONDS_PER_QUESTION
}

fn default_tick_millis() -> u64 {
    1000
}

impl Default for HttpSourceConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            seconds_per_question: default_seconds_per_question(),
            tick_millis: default_tick_millis(),
        }
    }
}

impl TimerConfig {
    /// Period between countdown ticks, never zero.
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_millis.max(1))
    }
}

impl HttpSourceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

impl Config {
    /// Load configuration from the standard config file location.
    /// Falls back to defaults if the file doesn't exist, then applies
    /// `QUIZCLOCK_SOURCE_URL` and `QUIZCLOCK_QUESTIONS_FILE` overrides.
    pub fn load() -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let config_path = Self::config_file_path();
        let mut config = if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            let config = Self::load_from_str(&contents)?;
            tracing::info!("Configuration loaded from {}", config_path.display());
            config
        } else {
            Config::default()
        };
        config.apply_overrides(
            std::env::var("QUIZCLOCK_SOURCE_URL").ok(),
            std::env::var("QUIZCLOCK_QUESTIONS_FILE").ok(),
        );
        Ok(config)
    }

    fn load_from_str(contents: &str) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        Ok(toml::from_str(contents)?)
    }

    /// A questions file wins over a URL when both are given.
    fn apply_overrides(&mut self, url: Option<String>, file: Option<String>) {
        if let Some(url) = url.filter(|u| !u.is_empty()) {
            self.source.provider = SourceProvider::Http;
            self.source.http.url = url;
        }
        if let Some(path) = file.filter(|p| !p.is_empty()) {
            self.source.provider = SourceProvider::File;
            self.source.file.path = path;
        }
    }

    fn config_file_path() -> PathBuf {
        let xdg_config = std::env::var("XDG_CONFIG_HOME")
            .unwrap_or_else(|_| {
                let home = std::env::var("HOME").unwrap_or_else(|_| "~".to_string());
                format!("{home}/.config")
            });
        Path::new(&xdg_config).join("quizclock").join("config.toml")
    }
}
