//! Service configuration.

use std::time::Duration;

use crate::error::{ClientError, Result};

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 60;

/// Immutable configuration handed to a service client at construction.
///
/// Built from [`ServiceConfig::new`] with chained `with_*` setters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Base URL of the service, without trailing slash.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// `User-Agent` header value.
    pub user_agent: String,
    /// Headers sent with every request. Per-request headers override these.
    pub default_headers: Vec<(String, String)>,
    /// Ask the server for gzip-compressed responses.
    pub enable_gzip: bool,
}

impl ServiceConfig {
    /// Create a configuration for the given base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
            user_agent: format!("cloud-billing-client/{}", env!("CARGO_PKG_VERSION")),
            default_headers: Vec::new(),
            enable_gzip: false,
        }
    }

    /// Set the base URL.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Add a header sent with every request.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// Enable or disable gzip response compression.
    #[must_use]
    pub fn with_gzip(mut self, enable: bool) -> Self {
        self.enable_gzip = enable;
        self
    }

    /// Check that the configuration can be used to build a client.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Configuration`] if the base URL is not an
    /// absolute http(s) URL or the timeout is zero.
    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.base_url).map_err(|e| {
            ClientError::Configuration(format!("invalid base URL {:?}: {e}", self.base_url))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ClientError::Configuration(format!(
                "unsupported URL scheme: {}",
                url.scheme()
            )));
        }
        if self.timeout.is_zero() {
            return Err(ClientError::Configuration(
                "timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_trailing_slash() {
        let config = ServiceConfig::new("https://billing.example.com/");
        assert_eq!(config.base_url, "https://billing.example.com");
        let config = config.with_base_url("http://localhost:8080//");
        assert_eq!(config.base_url, "http://localhost:8080");
    }

    #[test]
    fn builder_setters() {
        let config = ServiceConfig::new("https://billing.example.com")
            .with_timeout(Duration::from_secs(5))
            .with_user_agent("reporter/1.0")
            .with_header("X-Correlation-Id", "abc")
            .with_gzip(true);

        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.user_agent, "reporter/1.0");
        assert_eq!(
            config.default_headers,
            vec![("X-Correlation-Id".to_string(), "abc".to_string())]
        );
        assert!(config.enable_gzip);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_urls() {
        assert!(ServiceConfig::new("billing.example.com").validate().is_err());
        assert!(ServiceConfig::new("ftp://billing.example.com").validate().is_err());
        assert!(ServiceConfig::new("https://billing.example.com")
            .with_timeout(Duration::ZERO)
            .validate()
            .is_err());
    }
}
