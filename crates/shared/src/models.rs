use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Measurement system passed to the weather provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Imperial,
    Metric,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Imperial => "imperial",
            Units::Metric => "metric",
        }
    }

    pub fn temperature_symbol(&self) -> &'static str {
        match self {
            Units::Imperial => "°F",
            Units::Metric => "°C",
        }
    }

    pub fn speed_unit(&self) -> &'static str {
        match self {
            Units::Imperial => "mph",
            Units::Metric => "m/s",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "imperial" => Some(Units::Imperial),
            "metric" => Some(Units::Metric),
            _ => None,
        }
    }
}

/// A named set of briefing preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub city: String,
    pub units: Units,
    pub topics: Vec<String>,
    pub briefing_tone: String,
    pub max_articles_per_topic: u32,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            city: "New York, US".to_string(),
            units: Units::Imperial,
            topics: vec![
                "technology".to_string(),
                "business".to_string(),
                "world news".to_string(),
            ],
            briefing_tone: "professional but conversational".to_string(),
            max_articles_per_topic: 3,
        }
    }
}

impl Profile {
    pub const MAX_ARTICLES_LIMIT: u32 = 10;

    /// Default preferences for an ad-hoc location
    pub fn for_location(city: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            ..Self::default()
        }
    }

    /// Trim topics, drop blanks, and clamp the article count into 1..=10
    pub fn normalized(mut self) -> Self {
        self.city = self.city.trim().to_string();
        self.topics = self
            .topics
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
        self.max_articles_per_topic = self
            .max_articles_per_topic
            .clamp(1, Self::MAX_ARTICLES_LIMIT);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherReport {
    pub city: String,
    pub temperature: i64,
    pub feels_like: i64,
    pub description: String,
    pub humidity: u32,
    pub wind_speed: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastEntry {
    /// Local hour label, e.g. "3 PM"
    pub time: String,
    pub temp: i64,
    pub description: String,
    pub emoji: String,
    /// Precipitation probability in percent
    pub pop: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Headline {
    pub title: String,
    pub source: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicHeadlines {
    pub topic: String,
    pub headlines: Vec<Headline>,
}

/// Headlines grouped by topic, in profile order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HeadlineSet {
    pub topics: Vec<TopicHeadlines>,
}

impl HeadlineSet {
    pub fn total(&self) -> usize {
        self.topics.iter().map(|t| t.headlines.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn for_topic(&self, topic: &str) -> &[Headline] {
        self.topics
            .iter()
            .find(|t| t.topic == topic)
            .map(|t| t.headlines.as_slice())
            .unwrap_or(&[])
    }
}

/// Everything one pipeline run produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Briefing {
    pub text: String,
    pub weather: WeatherReport,
    pub forecast: Vec<ForecastEntry>,
    pub news: HeadlineSet,
    pub generated_at: DateTime<Local>,
}

impl Briefing {
    /// Clock time shown next to the briefing, e.g. "07:30 AM"
    pub fn generated_label(&self) -> String {
        self.generated_at.format("%I:%M %p").to_string()
    }
}
