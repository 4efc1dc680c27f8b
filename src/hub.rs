//! Hub protocol client
//!
//! Requests batches of signed URLs from the hub. One POST authorizes one
//! logical operation over a list of remote keys; the response carries the
//! URLs in request order, which downstream code relies on positionally.

use std::time::Duration;

use reqwest::StatusCode;

use artifact_protocol::{
    GenerateUrlsRequest, GenerateUrlsResponse, OperationType, SignedUrl, API_PATH,
};

use crate::config::{ConfigError, HubConfig};

/// Maximum attempts per batch request, including the first.
const MAX_ATTEMPTS: u32 = 5;

/// Base delay between attempts (doubles each retry, capped below).
const BASE_DELAY_MS: u64 = 100;

/// Longest wait between attempts.
const MAX_DELAY_MS: u64 = 1_000;

/// Hub protocol errors.
#[derive(Debug, thiserror::Error)]
pub enum HubError {
    #[error("hub request failed: {source}")]
    Transport {
        #[source]
        source: reqwest::Error,
    },

    #[error("hub returned {status} for {url}")]
    Request { status: StatusCode, url: String },

    #[error("hub refused the batch: {0}")]
    Service(String),

    #[error("malformed hub response: {source}")]
    Malformed {
        #[source]
        source: reqwest::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// HTTP client for the hub's signed-URL batch endpoint.
#[derive(Debug, Clone)]
pub struct HubClient {
    http: reqwest::Client,
    endpoint: url::Url,
}

impl HubClient {
    /// Build a client from validated configuration.
    ///
    /// The auth token is installed as a default `authorization` header so
    /// every batch request carries it.
    pub fn new(config: &HubConfig) -> Result<Self, HubError> {
        let mut headers = reqwest::header::HeaderMap::new();
        let mut auth = reqwest::header::HeaderValue::from_str(&config.token)
            .map_err(|_| ConfigError::InvalidToken)?;
        auth.set_sensitive(true);
        headers.insert(reqwest::header::AUTHORIZATION, auth);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|source| HubError::Transport { source })?;

        let endpoint = config
            .base_url
            .join(API_PATH.trim_start_matches('/'))
            .map_err(|e| ConfigError::InvalidEndpoint {
                endpoint: config.base_url.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self { http, endpoint })
    }

    /// Request one signed URL batch.
    ///
    /// Transport failures and 5xx responses are retried with doubling,
    /// capped backoff. 4xx responses, malformed bodies and a non-empty
    /// `error` field fail immediately; retrying cannot fix those.
    pub async fn generate_signed_urls(
        &self,
        remote_keys: &[String],
        operation: OperationType,
    ) -> Result<Vec<SignedUrl>, HubError> {
        let body = GenerateUrlsRequest {
            paths: remote_keys.to_vec(),
            operation,
        };

        let mut last_err: Option<HubError> = None;
        for attempt in 0..MAX_ATTEMPTS {
            if attempt > 0 {
                let delay = backoff_delay(attempt);
                tracing::warn!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "retrying signed-URL batch request"
                );
                tokio::time::sleep(delay).await;
            }

            tracing::debug!(keys = remote_keys.len(), ?operation, "requesting signed URLs");
            let result = self
                .http
                .post(self.endpoint.clone())
                .json(&body)
                .send()
                .await;

            let resp = match result {
                Ok(resp) => resp,
                Err(source) => {
                    last_err = Some(HubError::Transport { source });
                    continue;
                }
            };

            let status = resp.status();
            if status.is_server_error() {
                last_err = Some(HubError::Request {
                    status,
                    url: self.endpoint.to_string(),
                });
                continue;
            }
            if !status.is_success() {
                return Err(HubError::Request {
                    status,
                    url: self.endpoint.to_string(),
                });
            }

            let parsed: GenerateUrlsResponse = resp
                .json()
                .await
                .map_err(|source| HubError::Malformed { source })?;

            if !parsed.error.is_empty() {
                return Err(HubError::Service(parsed.error));
            }
            return Ok(parsed.urls);
        }

        Err(last_err.unwrap_or(HubError::Service(
            "signed-URL batch request never dispatched".to_string(),
        )))
    }
}

/// Delay before the given (1-based) retry attempt.
fn backoff_delay(attempt: u32) -> Duration {
    let ms = BASE_DELAY_MS.saturating_mul(1 << (attempt - 1));
    Duration::from_millis(ms.min(MAX_DELAY_MS))
}
