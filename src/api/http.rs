//! HTTP transport for stackdio REST API calls

use super::auth::Credentials;
use super::error::{Error, Result};
use super::version::CLIENT_VERSION;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Sanitize response body for logging
/// Truncates long responses and strips control characters
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let mut end = MAX_LOG_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... [truncated, {} bytes total]", &body[..end], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// Pull a human readable message out of an error response.
/// The server answers errors with `{"detail": "..."}`; anything else is
/// reported as a sanitized preview of the body.
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        if let Some(detail) = map.get("detail").and_then(|d| d.as_str()) {
            return detail.to_string();
        }
    }

    if body.trim().is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("no response body")
            .to_string();
    }

    sanitize_for_log(body)
}

/// Per-request options
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// JSON request body
    pub body: Option<Value>,
    /// Query string parameters
    pub query: Vec<(String, String)>,
    /// Return `Ok(None)` instead of an error when the server answers 404
    pub none_on_404: bool,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn query<K: ToString, V: ToString>(mut self, params: &[(K, V)]) -> Self {
        self.query
            .extend(params.iter().map(|(k, v)| (k.to_string(), v.to_string())));
        self
    }

    pub fn none_on_404(mut self, none_on_404: bool) -> Self {
        self.none_on_404 = none_on_404;
        self
    }
}

/// A successful (2xx) response
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: String,
}

impl ApiResponse {
    /// Raw response text
    pub fn text(&self) -> &str {
        &self.body
    }

    /// Decode the body as JSON. An empty body decodes as `null`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        if self.body.trim().is_empty() {
            return Ok(serde_json::from_value(Value::Null)?);
        }
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// HTTP client wrapper for stackdio API calls
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Create a new HTTP transport. Without a timeout requests block until
    /// the server answers.
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder =
            Client::builder().user_agent(format!("stackdio-client/{}", CLIENT_VERSION));

        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
        })
    }

    /// Execute one request
    pub async fn execute(
        &self,
        method: Method,
        url: Url,
        credentials: &Credentials,
        options: RequestOptions,
    ) -> Result<Option<ApiResponse>> {
        tracing::debug!("{} {}", method, url);

        let mut request = self
            .client
            .request(method.clone(), url.clone())
            .basic_auth(&credentials.username, Some(credentials.password()))
            .header(reqwest::header::ACCEPT, "application/json");

        if !options.query.is_empty() {
            request = request.query(&options.query);
        }

        if let Some(body) = &options.body {
            request = request.json(body);
        }

        let response = request.send().await?;

        let status = response.status();
        let body = response.text().await?;

        if status == StatusCode::NOT_FOUND && options.none_on_404 {
            tracing::debug!("{} {} returned 404, treating as empty", method, url);
            return Ok(None);
        }

        if !status.is_success() {
            // Security: Only log sanitized/truncated error body to avoid leaking sensitive data
            tracing::error!("API error: {} - {}", status, sanitize_for_log(&body));
            return Err(Error::Api {
                status,
                message: error_message(status, &body),
            });
        }

        Ok(Some(ApiResponse { status, body }))
    }
}
