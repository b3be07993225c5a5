use chrono::NaiveDate;

use crate::models::{ForecastEntry, HeadlineSet, Profile, WeatherReport};

/// Precipitation chance (percent) above which a forecast line mentions rain
pub const RAIN_MENTION_THRESHOLD: u32 = 10;

/// Everything the prompt is built from
pub struct PromptInput<'a> {
    pub date: NaiveDate,
    pub profile: &'a Profile,
    pub weather: &'a WeatherReport,
    pub forecast: &'a [ForecastEntry],
    pub news: &'a HeadlineSet,
}

fn weather_line(input: &PromptInput<'_>) -> String {
    let units = input.profile.units;
    let symbol = units.temperature_symbol();
    let w = input.weather;
    format!(
        "{}: {}{}, feels like {}{}, {}, humidity {}%, wind {} {}",
        w.city,
        w.temperature,
        symbol,
        w.feels_like,
        symbol,
        w.description,
        w.humidity,
        w.wind_speed,
        units.speed_unit()
    )
}

fn forecast_text(input: &PromptInput<'_>) -> String {
    if input.forecast.is_empty() {
        return "Forecast unavailable.".to_string();
    }

    let symbol = input.profile.units.temperature_symbol();
    input
        .forecast
        .iter()
        .map(|e| {
            let mut line = format!("  {}: {}{}, {}", e.time, e.temp, symbol, e.description);
            if e.pop > RAIN_MENTION_THRESHOLD {
                line.push_str(&format!(", {}% chance of rain", e.pop));
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn news_text(news: &HeadlineSet) -> String {
    let mut text = String::new();
    for group in &news.topics {
        text.push_str(&format!("\n{}:\n", group.topic.to_uppercase()));
        if group.headlines.is_empty() {
            text.push_str("  No articles found.\n");
        } else {
            for headline in &group.headlines {
                text.push_str(&format!("  - {} ({})\n", headline.title, headline.source));
            }
        }
    }
    text
}

/// Build the summarization prompt; the same input always yields the same text
pub fn compose_prompt(input: &PromptInput<'_>) -> String {
    format!(
        r#"Today is {today}.

Current conditions:
{weather}

Today's forecast (next 24 hours):
{forecast}

Today's top headlines by topic:
{news}

Please write a {tone} morning briefing based on this information.
Structure it as follows:
1. A warm, one-sentence greeting that acknowledges the day and weather.
2. A weather summary with practical advice (what to wear, any notable changes during the day).
3. A brief summary of the most interesting or important news across all topics,
   looking for connections between stories if any exist.
4. A single closing thought or question worth thinking about today.

Keep the total length to around 200-250 words. Be specific, not generic."#,
        today = input.date.format("%A, %B %d, %Y"),
        weather = weather_line(input),
        forecast = forecast_text(input),
        news = news_text(input.news),
        tone = input.profile.briefing_tone,
    )
}
