use reqwest::{header, Client, StatusCode};
use serde_json::Value;
use tokio::time::{sleep, Duration};
use tracing::{debug, warn};

use crate::config::FetchConfig;
use crate::error::{BridgeError, Result};

/// Body of a fetched URL; `json` is set when the server declared JSON and
/// the body parsed.
#[derive(Debug, Clone)]
pub struct FetchedDocument {
    pub url: String,
    pub content_type: Option<String>,
    pub body: String,
    pub json: Option<Value>,
}

impl FetchedDocument {
    fn new(url: &str, content_type: Option<String>, body: String) -> Self {
        let declared_json = content_type
            .as_deref()
            .is_some_and(|ct| ct.to_ascii_lowercase().contains("application/json"));
        let json = if declared_json {
            serde_json::from_str(&body).ok()
        } else {
            None
        };

        Self {
            url: url.to_string(),
            content_type,
            body,
            json,
        }
    }
}

/// Cheap to clone: the underlying `reqwest::Client` is reference counted.
#[derive(Clone)]
pub struct FetchClient {
    client: Client,
    user_agent: String,
    max_retries: u32,
}

impl FetchClient {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        config.validate()?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            user_agent: config.user_agent.clone(),
            max_retries: config.max_retries,
        })
    }

    fn build_headers(&self) -> header::HeaderMap {
        let mut headers = header::HeaderMap::new();
        if let Ok(agent) = header::HeaderValue::from_str(&self.user_agent) {
            headers.insert(header::USER_AGENT, agent);
        }
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json, text/markdown;q=0.9, */*;q=0.8"),
        );
        headers
    }

    /// GETs `url`, retrying server errors and transport failures with
    /// exponential backoff. A 429 is reported as `RateLimited` immediately.
    pub async fn fetch(&self, url: &str) -> Result<FetchedDocument> {
        let mut retries = 0;
        let mut last_error = None;

        while retries <= self.max_retries {
            if retries > 0 {
                let wait_time = 2u64.saturating_pow(retries);
                warn!(
                    url,
                    retry = retries,
                    max_retries = self.max_retries,
                    "request failed, retrying in {}s",
                    wait_time
                );
                sleep(Duration::from_secs(wait_time)).await;
            }

            match self.client.get(url).headers(self.build_headers()).send().await {
                Ok(response) => match response.status() {
                    status if status.is_success() => {
                        let content_type = response
                            .headers()
                            .get(header::CONTENT_TYPE)
                            .and_then(|h| h.to_str().ok())
                            .map(str::to_string);
                        let body = response
                            .text()
                            .await
                            .map_err(|e| BridgeError::Parse(e.to_string()))?;
                        debug!(url, content_type = ?content_type, bytes = body.len(), "fetched");
                        return Ok(FetchedDocument::new(url, content_type, body));
                    }
                    StatusCode::TOO_MANY_REQUESTS => {
                        let retry_after = response
                            .headers()
                            .get(header::RETRY_AFTER)
                            .and_then(|h| h.to_str().ok())
                            .and_then(|s| s.parse::<u64>().ok())
                            .unwrap_or(0);
                        return Err(BridgeError::RateLimited(retry_after));
                    }
                    status if status.is_client_error() => {
                        return Err(BridgeError::Network(format!(
                            "{} returned status {}",
                            url, status
                        )));
                    }
                    status => {
                        last_error = Some(BridgeError::Network(format!(
                            "{} returned status {}",
                            url, status
                        )));
                    }
                },
                Err(e) => {
                    last_error = Some(BridgeError::Network(e.to_string()));
                }
            }

            retries += 1;
        }

        Err(last_error
            .unwrap_or_else(|| BridgeError::Network("Maximum retries exceeded".to_string())))
    }
}
