use anyhow::{Context, Result};
use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{BriefingError, Provider};

pub const DEFAULT_WEATHER_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
pub const DEFAULT_NEWS_BASE_URL: &str = "https://newsapi.org/v2";
pub const DEFAULT_AI_BASE_URL: &str = "https://api.anthropic.com/v1";
pub const DEFAULT_MODEL: &str = "claude-haiku-4-5-20251001";

const APP_DIR: &str = "daily-briefing";

/// API keys per provider, read once at startup
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    keys: HashMap<Provider, String>,
}

impl Credentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key(mut self, provider: Provider, key: impl Into<String>) -> Self {
        let key = key.into();
        if !key.trim().is_empty() {
            self.keys.insert(provider, key);
        }
        self
    }

    /// Build credentials from any variable lookup; blank values count as missing
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Provider::ALL
            .iter()
            .fold(Self::new(), |creds, provider| match lookup(provider.env_var()) {
                Some(key) => creds.with_key(*provider, key),
                None => creds,
            })
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn get(&self, provider: Provider) -> Option<&str> {
        self.keys.get(&provider).map(String::as_str)
    }

    /// The key for `provider`, or a configuration error naming the variable to set
    pub fn require(&self, provider: Provider) -> crate::error::Result<&str> {
        self.get(provider).ok_or_else(|| {
            BriefingError::Configuration(format!(
                "{} not found. Set it as an environment variable or add it to ~/.config/{}/.env",
                provider.env_var(),
                APP_DIR
            ))
        })
    }

    pub fn missing(&self) -> Vec<Provider> {
        Provider::ALL
            .iter()
            .copied()
            .filter(|p| self.get(*p).is_none())
            .collect()
    }
}

/// Base URLs for the three providers
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub weather_base: String,
    pub news_base: String,
    pub ai_base: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            weather_base: DEFAULT_WEATHER_BASE_URL.to_string(),
            news_base: DEFAULT_NEWS_BASE_URL.to_string(),
            ai_base: DEFAULT_AI_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub model: String,
    pub max_tokens: u32,
    pub http_timeout: Duration,
    pub ai_timeout: Duration,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 1024,
            http_timeout: Duration::from_secs(30),
            ai_timeout: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub credentials: Credentials,
    pub endpoints: Endpoints,
    pub settings: PipelineSettings,
    pub data_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Try to load .env from multiple locations
        Self::try_load_dotenv();
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let credentials = Credentials::from_lookup(&lookup);

        let defaults = Endpoints::default();
        let endpoints = Endpoints {
            weather_base: lookup("BRIEFING_WEATHER_BASE_URL").unwrap_or(defaults.weather_base),
            news_base: lookup("BRIEFING_NEWS_BASE_URL").unwrap_or(defaults.news_base),
            ai_base: lookup("BRIEFING_AI_BASE_URL").unwrap_or(defaults.ai_base),
        };

        let mut settings = PipelineSettings::default();
        if let Some(model) = lookup("BRIEFING_MODEL") {
            settings.model = model;
        }
        if let Some(raw) = lookup("BRIEFING_MAX_TOKENS") {
            settings.max_tokens = raw
                .trim()
                .parse()
                .with_context(|| format!("BRIEFING_MAX_TOKENS is not a number: {}", raw))?;
        }
        if let Some(raw) = lookup("BRIEFING_HTTP_TIMEOUT_SECS") {
            settings.http_timeout = parse_secs("BRIEFING_HTTP_TIMEOUT_SECS", &raw)?;
        }
        if let Some(raw) = lookup("BRIEFING_AI_TIMEOUT_SECS") {
            settings.ai_timeout = parse_secs("BRIEFING_AI_TIMEOUT_SECS", &raw)?;
        }

        let data_dir = match lookup("BRIEFING_DATA_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => crate::io::get_default_data_dir()?,
        };

        Ok(Self {
            credentials,
            endpoints,
            settings,
            data_dir,
        })
    }

    fn try_load_dotenv() {
        // Try locations in order of preference:

        // 1. Current directory (for development)
        if dotenvy::dotenv().is_ok() {
            return;
        }

        // 2. ~/.config/daily-briefing/.env (standard config location)
        if let Some(config_dir) = dirs::config_dir() {
            let config_path = config_dir.join(APP_DIR).join(".env");
            if config_path.exists() && dotenvy::from_path(&config_path).is_ok() {
                return;
            }
        }

        // 3. ~/.env (home directory)
        if let Some(home_dir) = dirs::home_dir() {
            let home_path = home_dir.join(".env");
            if home_path.exists() {
                let _ = dotenvy::from_path(&home_path);
            }
        }

        // If none found, that's okay - environment variables might be set system-wide
    }
}

fn parse_secs(name: &str, raw: &str) -> Result<Duration> {
    let secs: u64 = raw
        .trim()
        .parse()
        .with_context(|| format!("{} is not a whole number of seconds: {}", name, raw))?;
    Ok(Duration::from_secs(secs))
}
