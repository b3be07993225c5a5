use reqwest::{Client, Response};
use std::time::Duration;
use url::Url;

use crate::error::{BriefingError, Provider, Result};

pub(crate) fn build_client(provider: Provider, timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| {
            BriefingError::upstream(provider, format!("Failed to create HTTP client: {}", e))
        })
}

/// Join `path` onto a provider base URL and append query parameters
pub(crate) fn endpoint(
    provider: Provider,
    base: &str,
    path: &str,
    params: &[(&str, &str)],
) -> Result<Url> {
    let raw = format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'));
    let parsed = if params.is_empty() {
        Url::parse(&raw)
    } else {
        Url::parse_with_params(&raw, params)
    };
    parsed.map_err(|e| {
        BriefingError::Configuration(format!("Invalid {} base URL {}: {}", provider, base, e))
    })
}

/// Copy of a URL safe to log: credential query parameters are masked
pub(crate) fn redacted(url: &Url) -> String {
    let mut clean = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let masked = matches!(k.as_ref(), "appid" | "apiKey");
            (
                k.into_owned(),
                if masked { "***".to_string() } else { v.into_owned() },
            )
        })
        .collect();
    clean.query_pairs_mut().clear().extend_pairs(pairs);
    clean.to_string()
}

/// Turn a reqwest failure (connect, timeout, body decode) into an upstream error.
/// The request URL is dropped since it can carry an API key.
pub(crate) fn transport(provider: Provider, context: &str, err: reqwest::Error) -> BriefingError {
    let message = if err.is_timeout() {
        format!("{}: request timed out", context)
    } else {
        format!("{}: {}", context, err.without_url())
    };
    BriefingError::upstream(provider, message)
}

/// Fail with an upstream error unless the response has a 2xx status
pub(crate) async fn ensure_success(provider: Provider, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let error_text = response
        .text()
        .await
        .unwrap_or_else(|_| String::from("unknown error"));
    Err(BriefingError::upstream(
        provider,
        format!("API returned error: {} - {}", status, error_text),
    ))
}
