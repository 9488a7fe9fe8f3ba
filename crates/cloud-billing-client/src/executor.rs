//! HTTP request execution.
//!
//! [`RequestExecutor`] is the seam between the service clients and the
//! network. [`HttpExecutor`] implements it with `reqwest`; tests substitute
//! their own implementations.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT};
use reqwest::Client;
use url::Url;

use crate::config::ServiceConfig;
use crate::error::{ClientError, Result};
use crate::request::{ApiRequest, RawResponse};

/// Performs one HTTP exchange.
///
/// Implementations return the status and raw body for every response the
/// server sends, including non-2xx ones. Only failures that prevent a
/// response (connect, TLS, timeout) are errors.
#[async_trait]
pub trait RequestExecutor: Send + Sync {
    /// Send the request and collect the response.
    async fn execute(&self, request: ApiRequest) -> Result<RawResponse>;
}

/// `reqwest`-backed executor bound to one service base URL.
#[derive(Debug, Clone)]
pub struct HttpExecutor {
    client: Client,
    base_url: Url,
    default_headers: HeaderMap,
    timeout: Duration,
}

impl HttpExecutor {
    /// Build an executor from a service configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Configuration`] if the configuration is invalid
    /// or the HTTP client cannot be built.
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        config.validate()?;

        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ClientError::Configuration(format!("invalid base URL: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::Configuration(format!(
                "base URL cannot be a base: {}",
                config.base_url
            )));
        }

        let mut default_headers = HeaderMap::new();
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        for (name, value) in &config.default_headers {
            let (name, value) = header_pair(name, value)?;
            default_headers.insert(name, value);
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .gzip(config.enable_gzip)
            .build()
            .map_err(|e| ClientError::Configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            default_headers,
            timeout: config.timeout,
        })
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn resolve(&self, request: &ApiRequest) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::Configuration("base URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(&request.segments);
        Ok(url)
    }
}

#[async_trait]
impl RequestExecutor for HttpExecutor {
    async fn execute(&self, request: ApiRequest) -> Result<RawResponse> {
        let url = self.resolve(&request)?;

        let mut headers = self.default_headers.clone();
        for (name, value) in &request.headers {
            let (name, value) = header_pair(name, value)?;
            headers.insert(name, value);
        }

        let mut builder = self
            .client
            .request(request.method.clone(), url)
            .headers(headers);
        if !request.query.is_empty() {
            builder = builder.query(request.query.as_slice());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| self.transport_error(e))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(e))?
            .to_vec();

        tracing::debug!(
            method = %request.method,
            path = %request.path(),
            status,
            bytes = body.len(),
            "request completed"
        );

        Ok(RawResponse { status, body })
    }
}

impl HttpExecutor {
    fn transport_error(&self, error: reqwest::Error) -> ClientError {
        if error.is_timeout() {
            ClientError::Timeout {
                after: self.timeout,
            }
        } else {
            ClientError::Http(error)
        }
    }
}

fn header_pair(name: &str, value: &str) -> Result<(HeaderName, HeaderValue)> {
    let header_name = HeaderName::from_bytes(name.as_bytes())
        .map_err(|_| ClientError::Configuration(format!("invalid header name: {name:?}")))?;
    let header_value = HeaderValue::from_str(value)
        .map_err(|_| ClientError::Configuration(format!("invalid value for header {name}")))?;
    Ok((header_name, header_value))
}
