//! HTTP Client
//!
//! Executes one logical API request, absorbing 429 throttling and a bounded
//! number of connection failures.

use crate::api::Query;
use crate::client::rate_limiter::RateLimitState;
use crate::config::ClientConfig;
use crate::error::{BallchasingError, Result};
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::error::Error as _;
use std::io::ErrorKind;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Retries after consecutive connection failures before giving up
pub const MAX_CONNECTION_RETRIES: u32 = 10;

/// Body of an API request
#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    #[default]
    Empty,

    /// JSON document
    Json(serde_json::Value),

    /// Multipart upload with a single `file` field
    File { name: String, data: Bytes },
}

/// One logical request: target, method, query and body
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,

    /// Absolute URL, or a path relative to the base URL starting with `/`
    pub target: String,

    pub query: Query,

    pub body: RequestBody,
}

impl ApiRequest {
    pub fn new(method: Method, target: impl Into<String>) -> Self {
        Self {
            method,
            target: target.into(),
            query: Query::new(),
            body: RequestBody::Empty,
        }
    }

    pub fn get(target: impl Into<String>) -> Self {
        Self::new(Method::GET, target)
    }

    pub fn post(target: impl Into<String>) -> Self {
        Self::new(Method::POST, target)
    }

    pub fn patch(target: impl Into<String>) -> Self {
        Self::new(Method::PATCH, target)
    }

    pub fn delete(target: impl Into<String>) -> Self {
        Self::new(Method::DELETE, target)
    }

    /// Append query pairs
    pub fn with_query(mut self, query: Query) -> Self {
        self.query.extend(query);
        self
    }

    pub fn with_param(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn with_json(mut self, body: serde_json::Value) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    pub fn with_file(mut self, name: impl Into<String>, data: Bytes) -> Self {
        self.body = RequestBody::File {
            name: name.into(),
            data,
        };
        self
    }
}

/// HTTP client with retry and rate limit handling
pub struct HttpClient {
    /// Inner reqwest client, carrying the auth header
    client: Client,

    base_url: String,

    /// Rate limit state
    rate_limit: Arc<RateLimitState>,

    warn_on_rate_limit: bool,
}

impl HttpClient {
    /// Create a new HTTP client
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut auth = HeaderValue::from_str(&config.api_key)
            .map_err(|e| BallchasingError::Config(format!("Invalid API key format: {}", e)))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| BallchasingError::Config(format!("Failed to create HTTP client: {}", e)))?;

        let rate_limit = match config.sleep_on_rate_limit {
            Some(sleep) => RateLimitState::fixed(config.tier, sleep),
            None => RateLimitState::for_tier(config.tier),
        };

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            rate_limit: Arc::new(rate_limit),
            warn_on_rate_limit: config.warn_on_rate_limit,
        })
    }

    /// Get the rate limit state
    pub fn rate_limit(&self) -> &Arc<RateLimitState> {
        &self.rate_limit
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for a target
    pub fn resolve(&self, target: &str) -> String {
        if target.starts_with('/') {
            format!("{}{}", self.base_url, target)
        } else {
            target.to_string()
        }
    }

    /// Send a request until it succeeds or fails terminally.
    ///
    /// 429 responses are retried without limit after the configured delay.
    /// Connection failures are retried immediately, at most
    /// `MAX_CONNECTION_RETRIES` times in a row. Timeouts and any other
    /// non-success status fail at once.
    pub async fn execute(&self, request: &ApiRequest) -> Result<Response> {
        let url = self.resolve(&request.target);
        let mut failures = 0u32;

        loop {
            debug!(method = %request.method, url = %url, "Sending request");

            let response = match self.build(request, &url).send().await {
                Ok(response) => response,
                Err(e) => {
                    failures += 1;

                    if e.is_timeout() {
                        error!(url = %url, "Request timed out");
                        return Err(BallchasingError::Transport {
                            attempts: failures,
                            source: e,
                        });
                    }

                    if is_connection_failure(&e) && failures <= MAX_CONNECTION_RETRIES {
                        error!(url = %url, attempt = failures, error = %e, "Connection failed, retrying");
                        continue;
                    }

                    return Err(BallchasingError::Transport {
                        attempts: failures,
                        source: e,
                    });
                }
            };
            failures = 0;

            let status = response.status();

            if status.is_success() {
                return Ok(response);
            }

            if status == StatusCode::TOO_MANY_REQUESTS {
                let (ordinal, sleep) = self.rate_limit.record();
                if self.warn_on_rate_limit {
                    warn!(url = %url, count = ordinal, "Rate limited (429)");
                } else {
                    debug!(url = %url, count = ordinal, "Rate limited (429)");
                }

                if !sleep.is_zero() {
                    tokio::time::sleep(sleep).await;
                }
                continue;
            }

            let body = response.text().await.unwrap_or_default();
            return Err(BallchasingError::Remote { status, body });
        }
    }

    /// Execute and decode a JSON response
    pub async fn execute_json<T: DeserializeOwned>(&self, request: &ApiRequest) -> Result<T> {
        let response = self.execute(request).await?;
        read_json(response, &request.target).await
    }

    /// Execute and discard the response body
    pub async fn execute_unit(&self, request: &ApiRequest) -> Result<()> {
        self.execute(request).await?;
        Ok(())
    }

    /// Build one attempt; multipart forms cannot be reused, so each attempt gets its own
    fn build(&self, request: &ApiRequest, url: &str) -> RequestBuilder {
        let mut builder = self.client.request(request.method.clone(), url);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::File { name, data } => {
                let part = Part::bytes(data.to_vec()).file_name(name.clone());
                builder.multipart(Form::new().part("file", part))
            }
        }
    }
}

/// Decode a successful response, reporting schema mismatches as validation errors
pub async fn read_json<T: DeserializeOwned>(response: Response, endpoint: &str) -> Result<T> {
    let body = response
        .text()
        .await
        .map_err(|e| BallchasingError::Transport {
            attempts: 1,
            source: e,
        })?;

    serde_json::from_str(&body).map_err(|e| BallchasingError::Validation {
        endpoint: endpoint.to_string(),
        message: format!(
            "{}. Body: {}",
            e,
            body.chars().take(500).collect::<String>()
        ),
    })
}

/// Connection refused, reset or dropped before a response
fn is_connection_failure(err: &reqwest::Error) -> bool {
    if err.is_connect() {
        return true;
    }

    let mut source = err.source();
    while let Some(cause) = source {
        if let Some(io) = cause.downcast_ref::<std::io::Error>() {
            return matches!(
                io.kind(),
                ErrorKind::ConnectionReset
                    | ErrorKind::ConnectionAborted
                    | ErrorKind::BrokenPipe
                    | ErrorKind::UnexpectedEof
            );
        }
        source = cause.source();
    }

    false
}
