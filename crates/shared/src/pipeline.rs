use chrono::Local;

use crate::config::{Config, Credentials, Endpoints, PipelineSettings};
use crate::error::{Provider, Result};
use crate::models::{Briefing, Profile};
use crate::news::NewsClient;
use crate::prompt::{compose_prompt, PromptInput};
use crate::summarizer::ClaudeSummarizer;
use crate::weather::WeatherClient;

/// Weather, headlines, prompt, summary: one sequential, fail-fast run
#[derive(Debug, Clone, Default)]
pub struct BriefingPipeline {
    endpoints: Endpoints,
    settings: PipelineSettings,
}

impl BriefingPipeline {
    pub fn new(endpoints: Endpoints, settings: PipelineSettings) -> Self {
        Self {
            endpoints,
            settings,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.endpoints.clone(), config.settings.clone())
    }

    pub async fn generate_briefing(
        &self,
        profile: &Profile,
        credentials: &Credentials,
    ) -> Result<Briefing> {
        // All keys are checked before the first request goes out
        let weather_key = credentials.require(Provider::Weather)?;
        let news_key = credentials.require(Provider::News)?;
        let ai_key = credentials.require(Provider::Ai)?;

        let weather_client = WeatherClient::new(
            self.endpoints.weather_base.as_str(),
            weather_key,
            self.settings.http_timeout,
        )?;
        let news_client = NewsClient::new(
            self.endpoints.news_base.as_str(),
            news_key,
            self.settings.http_timeout,
        )?;
        let summarizer =
            ClaudeSummarizer::new(self.endpoints.ai_base.as_str(), ai_key, &self.settings)?;

        tracing::info!(city = %profile.city, "Fetching weather");
        let weather = weather_client.current(&profile.city, profile.units).await?;
        let forecast = weather_client.forecast(&profile.city, profile.units).await?;

        tracing::info!(topics = profile.topics.len(), "Fetching headlines");
        let news = news_client
            .headlines(&profile.topics, profile.max_articles_per_topic)
            .await?;

        let now = Local::now();
        let prompt = compose_prompt(&PromptInput {
            date: now.date_naive(),
            profile,
            weather: &weather,
            forecast: &forecast,
            news: &news,
        });

        tracing::info!(headlines = news.total(), "Summarizing with Claude");
        let text = summarizer.generate(&prompt).await?;

        Ok(Briefing {
            text,
            weather,
            forecast,
            news,
            generated_at: now,
        })
    }
}
