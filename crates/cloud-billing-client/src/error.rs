//! Client error types.

use std::time::Duration;

use cloud_billing_core::ModelError;

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when using the clients.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// HTTP request failed before a response was received.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server returned a non-2xx response.
    #[error("API error: {status} {code} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error code from the response body, or `unknown`.
        code: String,
        /// Error message.
        message: String,
    },

    /// The call did not complete before its deadline.
    #[error("request timed out after {after:?}")]
    Timeout {
        /// The deadline that expired.
        after: Duration,
    },

    /// Response body could not be decoded into the expected model.
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// A next-page link could not be parsed as a URL.
    #[error("malformed next link {link:?}: {reason}")]
    MalformedLink {
        /// The link as returned by the server.
        link: String,
        /// Why parsing failed.
        reason: String,
    },

    /// A next link pointed back at the cursor that produced it.
    #[error("next link repeats cursor {cursor:?}")]
    RepeatedCursor {
        /// The repeated cursor.
        cursor: String,
    },

    /// A pager was advanced after it ran out of pages.
    #[error("pager is exhausted")]
    Exhausted,

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Invalid argument passed to an operation.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Invalid model value.
    #[error(transparent)]
    Model(#[from] ModelError),
}

impl ClientError {
    /// Whether the failure happened at the transport level (network, timeout, non-2xx).
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Api { .. } | Self::Timeout { .. })
    }

    /// Whether repeating the same call could succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(_) | Self::Timeout { .. } => true,
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// HTTP status code, if the server responded.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(status: u16) -> ClientError {
        ClientError::Api {
            status,
            code: "x".to_string(),
            message: "y".to_string(),
        }
    }

    #[test]
    fn retryable_statuses() {
        assert!(api(503).is_retryable());
        assert!(api(429).is_retryable());
        assert!(!api(404).is_retryable());
        assert!(ClientError::Timeout {
            after: Duration::from_secs(1)
        }
        .is_retryable());
        assert!(!ClientError::Exhausted.is_retryable());
    }

    #[test]
    fn transport_classification() {
        assert!(api(400).is_transport());
        assert_eq!(api(400).status(), Some(400));
        let malformed = ClientError::MalformedLink {
            link: "not a url".to_string(),
            reason: "relative URL without a base".to_string(),
        };
        assert!(!malformed.is_transport());
        assert_eq!(malformed.status(), None);
    }
}
