//! Transport-neutral request and response values.
//!
//! Service clients describe a call as an [`ApiRequest`]; a
//! [`RequestExecutor`](crate::executor::RequestExecutor) turns it into a
//! [`RawResponse`].

use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, Result};

/// Ordered query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    /// Create an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a parameter.
    pub fn push(&mut self, name: impl Into<String>, value: impl ToString) {
        self.0.push((name.into(), value.to_string()));
    }

    /// Append a parameter if the value is present.
    pub fn push_opt<V: ToString>(&mut self, name: &str, value: Option<V>) {
        if let Some(value) = value {
            self.push(name, value);
        }
    }

    /// Builder form of [`QueryParams::push`].
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.push(name, value);
        self
    }

    /// Whether a parameter with this name is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|(n, _)| n == name)
    }

    /// First value of the named parameter.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The parameters as name/value pairs.
    #[must_use]
    pub fn as_slice(&self) -> &[(String, String)] {
        &self.0
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.to_string()))
                .collect(),
        )
    }
}

/// One HTTP call, before it is bound to a transport.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// HTTP method.
    pub method: Method,
    /// Unescaped path segments appended to the base URL.
    pub segments: Vec<String>,
    /// Request headers.
    pub headers: Vec<(String, String)>,
    /// Query parameters.
    pub query: QueryParams,
    /// JSON body.
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    /// Create a request with the given method and path segments.
    pub fn new<I, S>(method: Method, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            method,
            segments: segments.into_iter().map(Into::into).collect(),
            headers: Vec::new(),
            query: QueryParams::new(),
            body: None,
        }
    }

    /// `GET` request.
    pub fn get<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Method::GET, segments)
    }

    /// `POST` request.
    pub fn post<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Method::POST, segments)
    }

    /// `PUT` request.
    pub fn put<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Method::PUT, segments)
    }

    /// `DELETE` request.
    pub fn delete<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Method::DELETE, segments)
    }

    /// Add a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Add several headers.
    #[must_use]
    pub fn with_headers<'a>(
        mut self,
        headers: impl IntoIterator<Item = &'a (String, String)>,
    ) -> Self {
        self.headers.extend(headers.into_iter().cloned());
        self
    }

    /// Replace the query parameters.
    #[must_use]
    pub fn with_query(mut self, query: QueryParams) -> Self {
        self.query = query;
        self
    }

    /// Attach a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if the body cannot be serialized.
    pub fn with_json<T: Serialize>(mut self, body: &T) -> Result<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    /// The path as it appears in logs, e.g. `/api/v1/routes`.
    #[must_use]
    pub fn path(&self) -> String {
        format!("/{}", self.segments.join("/"))
    }
}

/// Status and raw body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body.
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Whether the status is 2xx.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Return the body of a 2xx response, or the server's error otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Api`] for non-2xx responses.
    pub fn into_success(self) -> Result<Vec<u8>> {
        if self.is_success() {
            return Ok(self.body);
        }

        let (code, message) = match serde_json::from_slice::<ApiErrorResponse>(&self.body) {
            Ok(body) => body.code_and_message(),
            Err(_) => (None, None),
        };

        Err(ClientError::Api {
            status: self.status,
            code: code.unwrap_or_else(|| "unknown".to_string()),
            message: message.unwrap_or_else(|| format!("HTTP {}", self.status)),
        })
    }
}

/// Error document returned by the services.
#[derive(Debug, Clone, Default, Deserialize)]
struct ApiErrorResponse {
    #[serde(default)]
    errors: Vec<ApiErrorBody>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl ApiErrorResponse {
    fn code_and_message(self) -> (Option<String>, Option<String>) {
        if let Some(first) = self.errors.into_iter().next() {
            return (first.code, first.message);
        }
        (self.code, self.message.or(self.error))
    }
}
