use serde_json::{json, Value};
use shared::{
    BriefingError, BriefingPipeline, Credentials, Endpoints, PipelineSettings, Profile, Provider,
};
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BRIEFING_TEXT: &str = "Good morning! Light rain today, so grab a jacket.\n\nIn tech news, chips are in short supply.";

fn credentials() -> Credentials {
    Credentials::new()
        .with_key(Provider::Weather, "weather-key")
        .with_key(Provider::News, "news-key")
        .with_key(Provider::Ai, "ai-key")
}

fn pipeline(server: &MockServer) -> BriefingPipeline {
    pipeline_with(server, PipelineSettings::default())
}

fn pipeline_with(server: &MockServer, settings: PipelineSettings) -> BriefingPipeline {
    BriefingPipeline::new(
        Endpoints {
            weather_base: format!("{}/data/2.5", server.uri()),
            news_base: format!("{}/v2", server.uri()),
            ai_base: format!("{}/v1", server.uri()),
        },
        settings,
    )
}

fn profile() -> Profile {
    Profile {
        city: "Petaluma, US".to_string(),
        topics: vec!["technology".to_string(), "science".to_string()],
        ..Profile::default()
    }
}

fn current_weather() -> Value {
    json!({
        "name": "Petaluma",
        "main": {"temp": 54.4, "feels_like": 50.1, "humidity": 80},
        "weather": [{"description": "light rain"}],
        "wind": {"speed": 6}
    })
}

fn forecast() -> Value {
    json!({
        "list": [
            {"dt": 1760900400, "main": {"temp": 56.0}, "weather": [{"description": "moderate rain"}], "pop": 0.8},
            {"dt": 1760911200, "main": {"temp": 58.0}, "weather": [{"description": "overcast clouds"}], "pop": 0.05}
        ]
    })
}

fn articles(titles: &[&str]) -> Value {
    let items: Vec<Value> = titles
        .iter()
        .enumerate()
        .map(|(i, title)| {
            json!({
                "title": title,
                "url": format!("https://example.com/{}", i),
                "source": {"id": null, "name": "Wire"}
            })
        })
        .collect();
    json!({"status": "ok", "totalResults": items.len(), "articles": items})
}

fn claude_reply(text: &str) -> Value {
    json!({
        "id": "msg_1",
        "type": "message",
        "role": "assistant",
        "content": [{"type": "text", "text": text}]
    })
}

async fn mount_weather(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("q", "Petaluma, US"))
        .and(query_param("appid", "weather-key"))
        .and(query_param("units", "imperial"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_weather()))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .and(query_param("cnt", "8"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast()))
        .mount(server)
        .await;
}

async fn mount_news(server: &MockServer, topic: &str, titles: &[&str]) {
    Mock::given(method("GET"))
        .and(path("/v2/everything"))
        .and(query_param("q", topic))
        .and(query_param("apiKey", "news-key"))
        .and(query_param("pageSize", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(articles(titles)))
        .mount(server)
        .await;
}

async fn mount_claude(server: &MockServer, text: &str) {
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", "ai-key"))
        .and(header("anthropic-version", "2023-06-01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(claude_reply(text)))
        .mount(server)
        .await;
}

/// The prompt text sent to the AI endpoint, if any
async fn sent_prompt(server: &MockServer) -> Option<String> {
    let requests = server.received_requests().await?;
    let request = requests.iter().find(|r| r.url.path() == "/v1/messages")?;
    let body: Value = serde_json::from_slice(&request.body).ok()?;
    body["messages"][0]["content"].as_str().map(str::to_string)
}

#[tokio::test]
async fn test_successful_briefing() {
    let server = MockServer::start().await;
    mount_weather(&server).await;
    mount_news(&server, "technology", &["Chip shortage deepens", "New phone launched"]).await;
    mount_news(&server, "science", &["Comet visible tonight"]).await;
    mount_claude(&server, BRIEFING_TEXT).await;

    let briefing = pipeline(&server)
        .generate_briefing(&profile(), &credentials())
        .await
        .unwrap();

    assert_eq!(briefing.text, BRIEFING_TEXT);
    assert!(!briefing.text.to_lowercase().contains("error"));
    assert_eq!(briefing.weather.city, "Petaluma");
    assert_eq!(briefing.weather.temperature, 54);
    assert_eq!(briefing.forecast.len(), 2);
    assert_eq!(briefing.forecast[0].pop, 80);
    assert_eq!(briefing.news.total(), 3);
    assert_eq!(briefing.news.topics[0].topic, "technology");
    assert_eq!(briefing.news.topics[1].topic, "science");
}

#[tokio::test]
async fn test_prompt_embeds_condition_and_every_headline() {
    let server = MockServer::start().await;
    let long_title = "Researchers publish an extraordinarily detailed account of how a small team rebuilt a regional power grid after the storm, including every setback along the way";
    mount_weather(&server).await;
    mount_news(&server, "technology", &["Chip shortage deepens", long_title]).await;
    mount_news(&server, "science", &["Comet visible tonight"]).await;
    mount_claude(&server, BRIEFING_TEXT).await;

    pipeline(&server)
        .generate_briefing(&profile(), &credentials())
        .await
        .unwrap();

    let prompt = sent_prompt(&server).await.expect("prompt was sent");
    assert!(prompt.contains("light rain"));
    assert!(prompt.contains("Chip shortage deepens"));
    assert!(prompt.contains(long_title));
    assert!(prompt.contains("Comet visible tonight"));
    assert!(prompt.contains("80% chance of rain"));
}

#[tokio::test]
async fn test_missing_weather_key_fails_before_any_request() {
    let server = MockServer::start().await;
    let credentials = Credentials::new()
        .with_key(Provider::News, "news-key")
        .with_key(Provider::Ai, "ai-key");

    let err = pipeline(&server)
        .generate_briefing(&profile(), &credentials)
        .await
        .unwrap_err();

    assert!(err.is_configuration());
    assert!(err.to_string().contains("OPENWEATHER_API_KEY"));
    let requests = server.received_requests().await.unwrap();
    assert!(requests.is_empty());
}

#[tokio::test]
async fn test_missing_ai_key_fails_before_any_request() {
    let server = MockServer::start().await;
    let credentials = Credentials::new()
        .with_key(Provider::Weather, "weather-key")
        .with_key(Provider::News, "news-key");

    let err = pipeline(&server)
        .generate_briefing(&profile(), &credentials)
        .await
        .unwrap_err();

    assert!(err.is_configuration());
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_weather_failure_stops_pipeline() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .mount(&server)
        .await;
    Mock::given(path("/v2/everything"))
        .respond_with(ResponseTemplate::new(200).set_body_json(articles(&[])))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(claude_reply(BRIEFING_TEXT)))
        .expect(0)
        .mount(&server)
        .await;

    let err = pipeline(&server)
        .generate_briefing(&profile(), &credentials())
        .await
        .unwrap_err();

    match err {
        BriefingError::Upstream { provider, message } => {
            assert_eq!(provider, Provider::Weather);
            assert!(message.contains("500"));
        }
        other => panic!("expected upstream error, got {:?}", other),
    }
    server.verify().await;
}

#[tokio::test]
async fn test_zero_headlines_still_summarizes() {
    let server = MockServer::start().await;
    mount_weather(&server).await;
    mount_news(&server, "technology", &[]).await;
    mount_news(&server, "science", &[]).await;
    mount_claude(&server, BRIEFING_TEXT).await;

    let briefing = pipeline(&server)
        .generate_briefing(&profile(), &credentials())
        .await
        .unwrap();

    assert_eq!(briefing.text, BRIEFING_TEXT);
    assert!(briefing.news.is_empty());
    let prompt = sent_prompt(&server).await.unwrap();
    assert!(prompt.contains("TECHNOLOGY:\n  No articles found."));
    assert!(prompt.contains("SCIENCE:\n  No articles found."));
}

#[tokio::test]
async fn test_profile_without_topics_uses_top_headlines() {
    let server = MockServer::start().await;
    mount_weather(&server).await;
    Mock::given(method("GET"))
        .and(path("/v2/top-headlines"))
        .and(query_param("apiKey", "news-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(articles(&["Markets rally"])))
        .expect(1)
        .mount(&server)
        .await;
    mount_claude(&server, BRIEFING_TEXT).await;

    let profile = Profile {
        topics: vec![],
        ..profile()
    };
    let briefing = pipeline(&server)
        .generate_briefing(&profile, &credentials())
        .await
        .unwrap();

    assert_eq!(briefing.news.topics.len(), 1);
    assert_eq!(briefing.news.topics[0].headlines[0].title, "Markets rally");
    assert!(sent_prompt(&server).await.unwrap().contains("Markets rally"));
}

#[tokio::test]
async fn test_news_failure_is_upstream_and_skips_ai() {
    let server = MockServer::start().await;
    mount_weather(&server).await;
    Mock::given(path("/v2/everything"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"status": "error", "code": "apiKeyInvalid"})))
        .mount(&server)
        .await;
    Mock::given(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(claude_reply(BRIEFING_TEXT)))
        .expect(0)
        .mount(&server)
        .await;

    let err = pipeline(&server)
        .generate_briefing(&profile(), &credentials())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        BriefingError::Upstream {
            provider: Provider::News,
            ..
        }
    ));
    server.verify().await;
}

#[tokio::test]
async fn test_ai_error_status_is_upstream() {
    let server = MockServer::start().await;
    mount_weather(&server).await;
    mount_news(&server, "technology", &["Chip shortage deepens"]).await;
    mount_news(&server, "science", &[]).await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(529).set_body_string("overloaded"))
        .expect(1)
        .mount(&server)
        .await;

    let err = pipeline(&server)
        .generate_briefing(&profile(), &credentials())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        BriefingError::Upstream {
            provider: Provider::Ai,
            ..
        }
    ));
    server.verify().await;
}

#[tokio::test]
async fn test_empty_ai_text_is_upstream() {
    let server = MockServer::start().await;
    mount_weather(&server).await;
    mount_news(&server, "technology", &[]).await;
    mount_news(&server, "science", &[]).await;
    mount_claude(&server, "  ").await;

    let err = pipeline(&server)
        .generate_briefing(&profile(), &credentials())
        .await
        .unwrap_err();

    assert!(err.is_upstream());
    assert!(err.to_string().contains("empty response"));
}

#[tokio::test]
async fn test_slow_weather_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(current_weather())
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let settings = PipelineSettings {
        http_timeout: Duration::from_millis(200),
        ..PipelineSettings::default()
    };
    let err = pipeline_with(&server, settings)
        .generate_briefing(&profile(), &credentials())
        .await
        .unwrap_err();

    assert!(err.is_upstream());
    assert!(err.to_string().contains("timed out"));
}

#[tokio::test]
async fn test_forecast_failure_stops_pipeline() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_weather()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(path("/v2/everything"))
        .respond_with(ResponseTemplate::new(200).set_body_json(articles(&[])))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(claude_reply(BRIEFING_TEXT)))
        .expect(0)
        .mount(&server)
        .await;

    let err = pipeline(&server)
        .generate_briefing(&profile(), &credentials())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        BriefingError::Upstream {
            provider: Provider::Weather,
            ..
        }
    ));
    server.verify().await;
}

#[tokio::test]
async fn test_undecodable_weather_body_hides_api_key() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let err = pipeline(&server)
        .generate_briefing(&profile(), &credentials())
        .await
        .unwrap_err();

    let message = err.to_string();
    assert!(err.is_upstream());
    assert!(message.contains("Failed to parse weather response"));
    assert!(!message.contains("weather-key"), "{}", message);
}

#[tokio::test]
async fn test_refused_connection_hides_api_key() {
    let pipeline = BriefingPipeline::new(
        Endpoints {
            weather_base: "http://127.0.0.1:1/data/2.5".to_string(),
            news_base: "http://127.0.0.1:1/v2".to_string(),
            ai_base: "http://127.0.0.1:1/v1".to_string(),
        },
        PipelineSettings::default(),
    );

    let err = pipeline
        .generate_briefing(&profile(), &credentials())
        .await
        .unwrap_err();

    let message = err.to_string();
    assert!(err.is_upstream());
    assert!(message.contains("Failed to fetch weather"));
    assert!(!message.contains("weather-key"), "{}", message);
}
