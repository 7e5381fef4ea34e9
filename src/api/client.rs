//! stackdio Client
//!
//! Main client for interacting with the stackdio API, combining the session
//! context, the HTTP transport and per-operation dispatch.

use super::auth::{AuthLevel, Credentials, Session};
use super::endpoint::PathArgs;
use super::error::{Error, Result};
use super::http::{ApiResponse, HttpTransport, RequestOptions};
use super::version::{self, ApiVersion};
use reqwest::Method;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

/// Static description of one API operation: where it lives, which server
/// versions accept it and which credentials it needs.
#[derive(Debug, Clone, Copy)]
pub struct Operation {
    pub name: &'static str,
    pub method: HttpMethod,
    pub endpoint: &'static str,
    pub accepted_versions: &'static [&'static str],
    pub deprecated: bool,
    pub auth: AuthLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl From<HttpMethod> for Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Delete => Method::DELETE,
        }
    }
}

impl Operation {
    const fn new(name: &'static str, method: HttpMethod, endpoint: &'static str) -> Self {
        Self {
            name,
            method,
            endpoint,
            accepted_versions: &[],
            deprecated: false,
            auth: AuthLevel::User,
        }
    }

    pub const fn get(name: &'static str, endpoint: &'static str) -> Self {
        Self::new(name, HttpMethod::Get, endpoint)
    }

    pub const fn post(name: &'static str, endpoint: &'static str) -> Self {
        Self::new(name, HttpMethod::Post, endpoint)
    }

    pub const fn put(name: &'static str, endpoint: &'static str) -> Self {
        Self::new(name, HttpMethod::Put, endpoint)
    }

    pub const fn delete(name: &'static str, endpoint: &'static str) -> Self {
        Self::new(name, HttpMethod::Delete, endpoint)
    }

    /// Restrict the operation to server versions matching all constraints
    pub const fn accepted_versions(mut self, constraints: &'static [&'static str]) -> Self {
        self.accepted_versions = constraints;
        self
    }

    pub const fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }

    pub const fn admin(mut self) -> Self {
        self.auth = AuthLevel::Admin;
        self
    }
}

#[derive(Debug, Deserialize)]
struct VersionInfo {
    version: String,
}

const GET_VERSION: Operation = Operation::get("get_version", "version/");

/// Main stackdio client
#[derive(Clone)]
pub struct StackdioClient {
    pub session: Session,
    pub http: HttpTransport,
}

impl StackdioClient {
    /// Create a client for `base_url`. The session starts unauthenticated:
    /// version-gated operations fail until [`authenticate`](Self::authenticate)
    /// has run.
    pub fn new(base_url: &str, credentials: Credentials) -> Result<Self> {
        Self::from_session(Session::new(base_url, credentials)?, None)
    }

    /// Create a client from an existing session, with an optional per-request timeout
    pub fn from_session(session: Session, timeout: Option<Duration>) -> Result<Self> {
        Ok(Self {
            session,
            http: HttpTransport::new(timeout)?,
        })
    }

    /// Create a client and authenticate it in one step
    pub async fn connect(base_url: &str, credentials: Credentials) -> Result<Self> {
        let mut client = Self::new(base_url, credentials)?;
        client.authenticate().await?;
        Ok(client)
    }

    /// Verify the credentials against the server and record its API version
    pub async fn authenticate(&mut self) -> Result<ApiVersion> {
        let info: VersionInfo = self.invoke_json(&GET_VERSION, &PathArgs::new()).await?;
        let version: ApiVersion = info.version.parse()?;

        tracing::info!(
            "Authenticated as {} against {} (server version {})",
            self.session.credentials_for(AuthLevel::User)?.username,
            self.session.base_url(),
            version
        );

        self.session.set_server_version(version);
        Ok(version)
    }

    /// Server version negotiated by [`authenticate`](Self::authenticate)
    pub fn server_version(&self) -> Option<ApiVersion> {
        self.session.server_version()
    }

    /// Run one operation: check the version gate, resolve the endpoint and
    /// issue the request. Returns `None` only when `options.none_on_404` is
    /// set and the server answered 404.
    pub async fn invoke(
        &self,
        op: &Operation,
        args: &PathArgs,
        options: RequestOptions,
    ) -> Result<Option<ApiResponse>> {
        version::check_accepted(op.name, op.accepted_versions, self.session.server_version())?;

        if op.deprecated {
            tracing::warn!("{} is deprecated and will be removed in a future release", op.name);
        }

        let path = args.resolve(op.endpoint)?;
        let url = self.session.url_for(&path)?;
        let credentials = self.session.credentials_for(op.auth)?;

        self.http
            .execute(op.method.into(), url, credentials, options)
            .await
    }

    /// Run an operation and decode its JSON body
    pub async fn invoke_json<T: serde::de::DeserializeOwned>(
        &self,
        op: &Operation,
        args: &PathArgs,
    ) -> Result<T> {
        self.invoke_json_with(op, args, RequestOptions::new()).await
    }

    /// Run an operation with request options and decode its JSON body
    pub async fn invoke_json_with<T: serde::de::DeserializeOwned>(
        &self,
        op: &Operation,
        args: &PathArgs,
        options: RequestOptions,
    ) -> Result<T> {
        match self.invoke(op, args, options).await? {
            Some(response) => response.json(),
            None => Err(Error::UnexpectedResponse(format!(
                "{} returned no content",
                op.name
            ))),
        }
    }

    /// Run an operation, mapping a 404 to `None` when `none_on_404` is set
    pub async fn invoke_optional(
        &self,
        op: &Operation,
        args: &PathArgs,
        none_on_404: bool,
    ) -> Result<Option<Value>> {
        let options = RequestOptions::new().none_on_404(none_on_404);
        match self.invoke(op, args, options).await? {
            Some(response) => response.json().map(Some),
            None => Ok(None),
        }
    }

    /// Run a list/search operation and unwrap its `results` envelope
    pub async fn invoke_results(
        &self,
        op: &Operation,
        args: &PathArgs,
        options: RequestOptions,
    ) -> Result<Vec<Value>> {
        let body: Value = self.invoke_json_with(op, args, options).await?;
        take_results(body)
    }
}

/// Take a named field out of a JSON object body
pub fn take_field(body: Value, field: &str) -> Result<Value> {
    match body {
        Value::Object(mut map) => map.remove(field).ok_or_else(|| {
            Error::UnexpectedResponse(format!("missing '{}' field", field))
        }),
        other => Err(Error::UnexpectedResponse(format!(
            "expected an object with '{}', got {}",
            field,
            json_kind(&other)
        ))),
    }
}

/// Unwrap the `results` list of a paginated response
pub fn take_results(body: Value) -> Result<Vec<Value>> {
    match take_field(body, "results")? {
        Value::Array(items) => Ok(items),
        other => Err(Error::UnexpectedResponse(format!(
            "expected 'results' to be a list, got {}",
            json_kind(&other)
        ))),
    }
}

/// Numeric `id` of an entity
pub fn entity_id(entity: &Value) -> Result<u64> {
    entity
        .get("id")
        .and_then(|id| id.as_u64())
        .ok_or_else(|| Error::UnexpectedResponse("entity without a numeric 'id'".to_string()))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
