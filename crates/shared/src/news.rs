use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::error::{Provider, Result};
use crate::http;
use crate::models::{Headline, HeadlineSet, TopicHeadlines};

/// Group label used when a profile has no topics
pub const TOP_HEADLINES: &str = "top headlines";

#[derive(Debug, Deserialize)]
struct NewsResponse {
    #[serde(default)]
    articles: Vec<Article>,
}

#[derive(Debug, Deserialize)]
struct Article {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    source: Option<Source>,
}

#[derive(Debug, Deserialize)]
struct Source {
    #[serde(default)]
    name: Option<String>,
}

impl NewsResponse {
    /// Keep articles that have a title; everything else is optional
    fn into_headlines(self) -> Vec<Headline> {
        self.articles
            .into_iter()
            .filter_map(|article| {
                let title = article.title.filter(|t| !t.trim().is_empty())?;
                Some(Headline {
                    title,
                    source: article
                        .source
                        .and_then(|s| s.name)
                        .unwrap_or_else(|| "Unknown".to_string()),
                    url: article.url.unwrap_or_default(),
                })
            })
            .collect()
    }
}

/// Client for a NewsAPI-compatible API
pub struct NewsClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl NewsClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: http::build_client(Provider::News, timeout)?,
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }

    async fn fetch(&self, path: &str, params: &[(&str, &str)]) -> Result<Vec<Headline>> {
        let url = http::endpoint(Provider::News, &self.base_url, path, params)?;
        tracing::debug!(url = %http::redacted(&url), "Requesting headlines");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| http::transport(Provider::News, "Failed to fetch headlines", e))?;

        let news = http::ensure_success(Provider::News, response)
            .await?
            .json::<NewsResponse>()
            .await
            .map_err(|e| http::transport(Provider::News, "Failed to parse news response", e))?;

        Ok(news.into_headlines())
    }

    /// Newest English-language articles matching `topic`
    pub async fn everything(&self, topic: &str, page_size: u32) -> Result<Vec<Headline>> {
        let page_size = page_size.to_string();
        self.fetch(
            "everything",
            &[
                ("q", topic),
                ("apiKey", self.api_key.as_str()),
                ("language", "en"),
                ("sortBy", "publishedAt"),
                ("pageSize", page_size.as_str()),
            ],
        )
        .await
    }

    pub async fn top_headlines(&self, page_size: u32) -> Result<Vec<Headline>> {
        let page_size = page_size.to_string();
        self.fetch(
            "top-headlines",
            &[
                ("apiKey", self.api_key.as_str()),
                ("language", "en"),
                ("pageSize", page_size.as_str()),
            ],
        )
        .await
    }

    /// One request per topic, in order; any failed request fails the whole set
    pub async fn headlines(&self, topics: &[String], page_size: u32) -> Result<HeadlineSet> {
        if topics.is_empty() {
            let headlines = self.top_headlines(page_size).await?;
            return Ok(HeadlineSet {
                topics: vec![TopicHeadlines {
                    topic: TOP_HEADLINES.to_string(),
                    headlines,
                }],
            });
        }

        let mut set = HeadlineSet::default();
        for topic in topics {
            let headlines = self.everything(topic, page_size).await?;
            tracing::debug!(topic = %topic, count = headlines.len(), "Fetched headlines");
            set.topics.push(TopicHeadlines {
                topic: topic.clone(),
                headlines,
            });
        }
        Ok(set)
    }
}
