//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the harvester, including:
//! - Building an HTTP client with a browser-like identity
//! - GET requests for menu, listing, and product detail pages
//! - Retry with exponential backoff for transport-level failures
//! - Error classification (retryable transport vs. terminal HTTP status)

use crate::config::HttpConfig;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// Errors produced by a fetch operation
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport-level failure (connect, timeout, TLS) that survived
    /// every configured attempt
    #[error("request for {url} failed after {attempts} attempts: {source}")]
    Transport {
        url: String,
        attempts: u32,
        source: reqwest::Error,
    },

    /// Deterministic server rejection; never retried
    #[error("HTTP {status} for {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
}

/// Builds the HTTP client used for every request of a harvest run
///
/// The source site serves an incomplete certificate chain, so TLS
/// verification is disabled. This is a documented property of the
/// target, not an oversight.
///
/// # Arguments
///
/// * `config` - HTTP client configuration (user agent, timeout)
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_secs(config.timeout_secs))
        .danger_accept_invalid_certs(true)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL and returns the response body
///
/// # Retry Logic
///
/// | Condition | Action |
/// |-----------|--------|
/// | Transport/TLS error | Retry up to `retry-attempts`, backoff `base^attempt` seconds |
/// | HTTP status >= 400 | Immediate `FetchError::Status`, no retry |
/// | Body read error | Treated as transport, retried |
///
/// Retrying a 4xx/5xx would not change a deterministic server rejection,
/// so those fail fast; only transport-level errors get backoff.
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The URL to fetch
/// * `config` - Retry/backoff configuration
///
/// # Returns
///
/// * `Ok(String)` - Response body
/// * `Err(FetchError)` - Terminal failure scoped to this URL
pub async fn fetch_page(client: &Client, url: &str, config: &HttpConfig) -> Result<String, FetchError> {
    let mut attempt: u32 = 0;

    loop {
        let outcome = match client.get(url).send().await {
            Ok(response) => {
                let status = response.status();
                if status.is_client_error() || status.is_server_error() {
                    return Err(FetchError::Status {
                        url: url.to_string(),
                        status,
                    });
                }
                response.text().await
            }
            Err(e) => Err(e),
        };

        match outcome {
            Ok(body) => return Ok(body),
            Err(source) => {
                attempt += 1;
                if attempt >= config.retry_attempts {
                    return Err(FetchError::Transport {
                        url: url.to_string(),
                        attempts: attempt,
                        source,
                    });
                }

                let backoff =
                    Duration::from_secs(config.backoff_base_secs.saturating_pow(attempt - 1));
                tracing::warn!(
                    url,
                    attempt,
                    backoff_secs = backoff.as_secs(),
                    error = %source,
                    "fetch attempt failed, backing off"
                );
                tokio::time::sleep(backoff).await;
            }
        }
    }
}
