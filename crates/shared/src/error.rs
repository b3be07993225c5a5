use std::fmt;

/// Third-party APIs the pipeline talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Provider {
    Weather,
    News,
    Ai,
}

impl Provider {
    pub const ALL: [Provider; 3] = [Provider::Weather, Provider::News, Provider::Ai];

    /// Environment variable holding this provider's API key
    pub fn env_var(&self) -> &'static str {
        match self {
            Provider::Weather => "OPENWEATHER_API_KEY",
            Provider::News => "NEWS_API_KEY",
            Provider::Ai => "ANTHROPIC_API_KEY",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Provider::Weather => "weather",
            Provider::News => "news",
            Provider::Ai => "ai",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(thiserror::Error, Debug)]
pub enum BriefingError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("{provider} provider error: {message}")]
    Upstream { provider: Provider, message: String },
}

impl BriefingError {
    pub fn upstream(provider: Provider, message: impl Into<String>) -> Self {
        BriefingError::Upstream {
            provider,
            message: message.into(),
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, BriefingError::Configuration(_))
    }

    pub fn is_upstream(&self) -> bool {
        matches!(self, BriefingError::Upstream { .. })
    }
}

pub type Result<T> = std::result::Result<T, BriefingError>;
