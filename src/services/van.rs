use crate::config::{ApiSettings, RetrySettings};
use crate::core::extract::ExtractError;
use crate::models::{PeoplePage, PeopleQuery, Record};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, RETRY_AFTER};
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when talking to the directory API
#[derive(Debug, Error)]
pub enum VanError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Authentication failed: check application name and API key")]
    AuthenticationFailure,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rate limited by API")]
    RateLimited { retry_after: Option<Duration> },

    #[error("Transient failure: {0}")]
    Transient(String),

    #[error("API returned {status}: {body}")]
    Api { status: StatusCode, body: String },

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Refusing to follow link outside {base}: {url}")]
    ForeignLink { base: String, url: String },

    #[error("Extraction failed: {0}")]
    Extract(#[from] ExtractError),
}

impl VanError {
    /// Whether retrying the same request could succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, VanError::RateLimited { .. } | VanError::Transient(_))
    }
}

/// The directory operations the search and pagination logic depend on
#[async_trait]
pub trait DirectoryApi: Send + Sync {
    /// `GET /people` with the given filters
    async fn search_people(&self, query: &PeopleQuery) -> Result<PeoplePage, VanError>;

    /// Follow a `nextPageLink` returned by a previous page
    async fn fetch_page(&self, next_page_link: &str) -> Result<PeoplePage, VanError>;

    /// `GET /people/{vanId}`; a bare record, no page wrapper
    async fn get_person(&self, van_id: &str, expand_districts: bool) -> Result<Record, VanError>;
}

/// Directory API client
///
/// Every request carries `accept: application/json` and HTTP Basic auth with the
/// application name as user and the API key (with database mode suffix) as
/// password. Rate-limit and transient failures are retried with exponential
/// backoff.
pub struct VanClient {
    base_url: String,
    base: Url,
    application_name: String,
    password: String,
    client: Client,
    retry: RetrySettings,
}

impl VanClient {
    /// Create a new client
    pub fn new(api: &ApiSettings, retry: RetrySettings) -> Result<Self, VanError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(api.timeout_secs))
            .build()?;
        let base_url = api.base_url.trim_end_matches('/').to_string();
        let base = parse_url(&base_url)?;

        Ok(Self {
            base_url,
            base,
            application_name: api.application_name.clone(),
            password: api.password(),
            client,
            retry,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `base_url + path` with query parameters and parse the JSON body
    pub async fn get(&self, path: &str, params: &[(&str, String)]) -> Result<Value, VanError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(url = %url, params = ?params, "GET");
        self.send_with_retry(|| self.client.get(&url).query(params)).await
    }

    /// GET a full URL, as handed out in `nextPageLink`.
    ///
    /// The URL must share scheme, host and port with `base_url`; credentials
    /// are never sent anywhere else.
    pub async fn get_url(&self, url: &str) -> Result<Value, VanError> {
        let target = parse_url(url)?;
        if target.origin() != self.base.origin() {
            tracing::error!(url = %url, base = %self.base_url, "Link leaves the API origin");
            return Err(VanError::ForeignLink {
                base: self.base_url.clone(),
                url: url.to_string(),
            });
        }

        tracing::debug!(url = %url, "GET");
        self.send_with_retry(|| self.client.get(target.clone())).await
    }

    async fn send_with_retry<F>(&self, build: F) -> Result<Value, VanError>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut attempt = 0;
        loop {
            match self.send_once(build()).await {
                Err(e) if e.is_retryable() && attempt < self.retry.max_retries => {
                    let delay = self.backoff(attempt, &e);
                    tracing::warn!(
                        attempt = attempt + 1,
                        max_retries = self.retry.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        "Retrying after error: {}",
                        e
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    /// `base * 2^attempt`, or the server's Retry-After, capped either way
    fn backoff(&self, attempt: u32, error: &VanError) -> Duration {
        let cap = Duration::from_millis(self.retry.max_backoff_ms);
        let computed = Duration::from_millis(
            self.retry
                .base_backoff_ms
                .saturating_mul(1u64.checked_shl(attempt).unwrap_or(u64::MAX)),
        );
        let delay = match error {
            VanError::RateLimited { retry_after: Some(after) } => *after,
            _ => computed,
        };
        delay.min(cap)
    }

    async fn send_once(&self, request: RequestBuilder) -> Result<Value, VanError> {
        let response = request
            .header(ACCEPT, "application/json")
            .basic_auth(&self.application_name, Some(&self.password))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() || e.is_connect() {
                    VanError::Transient(e.to_string())
                } else {
                    VanError::Request(e)
                }
            })?;

        let status = response.status();
        if status.is_success() {
            return response
                .json()
                .await
                .map_err(|e| VanError::UnexpectedResponse(format!("Invalid JSON body: {}", e)));
        }

        let url = response.url().to_string();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_secs);
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read body".to_string());

        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                tracing::error!("Authentication rejected for {}: {}", url, status);
                VanError::AuthenticationFailure
            }
            StatusCode::NOT_FOUND => VanError::NotFound(url),
            StatusCode::TOO_MANY_REQUESTS => VanError::RateLimited { retry_after },
            s if s.is_server_error() => VanError::Transient(format!("{}: {}", s, body)),
            s => VanError::Api { status: s, body },
        })
    }
}

fn parse_page(json: Value) -> Result<PeoplePage, VanError> {
    let page: PeoplePage = serde_json::from_value(json)
        .map_err(|e| VanError::UnexpectedResponse(format!("Malformed people page: {}", e)))?;
    page.check_shape().map_err(VanError::UnexpectedResponse)?;
    Ok(page)
}

#[async_trait]
impl DirectoryApi for VanClient {
    async fn search_people(&self, query: &PeopleQuery) -> Result<PeoplePage, VanError> {
        let json = self.get("/people", &query.to_params()).await?;
        parse_page(json)
    }

    async fn fetch_page(&self, next_page_link: &str) -> Result<PeoplePage, VanError> {
        let json = self.get_url(next_page_link).await?;
        parse_page(json)
    }

    async fn get_person(&self, van_id: &str, expand_districts: bool) -> Result<Record, VanError> {
        let path = format!("/people/{}", urlencoding::encode(van_id));
        let params = if expand_districts {
            vec![("$expand", "districts".to_string())]
        } else {
            vec![]
        };

        match self.get(&path, &params).await? {
            Value::Object(record) => Ok(record),
            other => Err(VanError::UnexpectedResponse(format!(
                "Expected a person object, found {}",
                crate::core::extract::type_name(&other)
            ))),
        }
    }
}

fn parse_url(url: &str) -> Result<Url, VanError> {
    Url::parse(url).map_err(|e| VanError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })
}
