//! GraphQL transport: request envelope, status mapping, retry.
//!
//! This is the ONLY place for HTTP status handling. Entities and the request
//! builder only ever see `data` objects or `DsError`.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, USER_AGENT};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{DsError, DsResult};

/// User-Agent sent with every request.
pub const CLIENT_USER_AGENT: &str = concat!("demarches-client/", env!("CARGO_PKG_VERSION"));

/// A fully-bound GraphQL request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphqlRequest {
    pub query: String,

    #[serde(rename = "operationName")]
    pub operation_name: String,

    pub variables: Map<String, Value>,
}

/// Executes GraphQL requests and returns the `data` object.
#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    async fn execute(&self, request: &GraphqlRequest) -> DsResult<Value>;
}

#[derive(Debug, Deserialize)]
struct GraphqlEnvelope {
    #[serde(default)]
    data: Option<Value>,

    #[serde(default)]
    errors: Vec<GraphqlErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct GraphqlErrorEntry {
    message: String,
}

/// HTTP transport (holds reqwest client, endpoint, token, retry policy).
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    url: String,
    token: Option<String>,
    max_retries: u32,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> DsResult<Self> {
        config.validate()?;

        let mut default_headers = HeaderMap::new();
        default_headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(default_headers)
            .build()
            .map_err(|e| DsError::Network {
                message: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            url: config.url.clone(),
            token: config.token.clone(),
            max_retries: config.max_retries,
        })
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    async fn execute_once(&self, request: &GraphqlRequest) -> DsResult<Value> {
        let mut builder = self.client.post(&self.url).json(request);

        if let Some(token) = &self.token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
        }

        let response = builder.send().await?;
        let status = response.status();

        match status.as_u16() {
            200..=299 => {
                let envelope: GraphqlEnvelope =
                    response
                        .json()
                        .await
                        .map_err(|e| DsError::InvalidResponse {
                            message: format!("failed to parse GraphQL response: {}", e),
                        })?;
                unwrap_envelope(envelope)
            }

            401 | 403 => Err(DsError::Unauthorized {
                message: "invalid or expired token".to_string(),
            }),

            429 => {
                let retry_after = response
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .map(Duration::from_secs);

                Err(DsError::RateLimited { retry_after })
            }

            _ => {
                let message = response.text().await.unwrap_or_else(|_| status.to_string());
                Err(DsError::Network {
                    message: format!("HTTP {}: {}", status.as_u16(), message),
                })
            }
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: &GraphqlRequest) -> DsResult<Value> {
        let mut retries = 0;

        loop {
            match self.execute_once(request).await {
                Ok(data) => return Ok(data),
                Err(e) if e.is_retryable() && retries < self.max_retries => {
                    retries += 1;
                    let backoff = backoff_for(&e, retries);

                    warn!(
                        error = %e,
                        operation = %request.operation_name,
                        retry = retries,
                        max_retries = self.max_retries,
                        backoff_ms = backoff.as_millis(),
                        "retrying request"
                    );

                    tokio::time::sleep(backoff).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Extract `data` from a GraphQL envelope.
///
/// Any entry in `errors` fails the whole request, even when `data` carries a
/// partial result: callers never see half-populated responses.
fn unwrap_envelope(envelope: GraphqlEnvelope) -> DsResult<Value> {
    if !envelope.errors.is_empty() {
        let messages: Vec<String> = envelope.errors.into_iter().map(|e| e.message).collect();
        debug!(count = messages.len(), "GraphQL errors in response");
        return Err(DsError::GraphQl { messages });
    }

    match envelope.data {
        Some(data) if !data.is_null() => Ok(data),
        _ => Err(DsError::InvalidResponse {
            message: "response has no data".to_string(),
        }),
    }
}

fn backoff_for(error: &DsError, retries: u32) -> Duration {
    use rand::Rng;

    match error {
        DsError::RateLimited {
            retry_after: Some(retry_after),
        } => {
            let capped = (*retry_after).min(Duration::from_secs(30));
            let base_ms = capped.as_millis() as u64;
            let jitter_factor: f64 = rand::thread_rng().gen_range(0.9_f64..=1.1_f64);
            let jittered_ms = ((base_ms as f64) * jitter_factor).round() as u64;
            Duration::from_millis(jittered_ms.max(100))
        }
        _ => {
            let base_backoff = Duration::from_secs(1 << retries.min(5));
            let base_backoff = base_backoff.min(Duration::from_secs(30));
            let jittered_ms = rand::thread_rng().gen_range(0..=base_backoff.as_millis() as u64);
            Duration::from_millis(jittered_ms.max(10))
        }
    }
}
