//! Session context
//!
//! Holds everything a client needs to talk to one stackdio server: the API
//! base URL, user and admin credentials, and the server version negotiated
//! when the session was authenticated.

use super::error::{Error, Result};
use super::version::ApiVersion;
use std::fmt;
use url::Url;

/// Username/password pair sent as HTTP basic auth
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

// Security: never print the password
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Which set of credentials a request is sent with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthLevel {
    #[default]
    User,
    Admin,
}

/// Per-client session state
#[derive(Debug, Clone)]
pub struct Session {
    base_url: Url,
    credentials: Credentials,
    admin_credentials: Option<Credentials>,
    server_version: Option<ApiVersion>,
}

impl Session {
    /// Create an unauthenticated session. The base URL always ends up with
    /// a trailing slash so that endpoint paths join below it.
    pub fn new(base_url: &str, credentials: Credentials) -> Result<Self> {
        let mut base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase));
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            base_url,
            credentials,
            admin_credentials: None,
            server_version: None,
        })
    }

    pub fn with_admin_credentials(mut self, credentials: Credentials) -> Self {
        self.admin_credentials = Some(credentials);
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Credentials for the requested level
    pub fn credentials_for(&self, level: AuthLevel) -> Result<&Credentials> {
        match level {
            AuthLevel::User => Ok(&self.credentials),
            AuthLevel::Admin => self
                .admin_credentials
                .as_ref()
                .ok_or(Error::MissingCredentials("admin")),
        }
    }

    /// Version reported by the server, `None` until authenticated
    pub fn server_version(&self) -> Option<ApiVersion> {
        self.server_version
    }

    pub fn is_authenticated(&self) -> bool {
        self.server_version.is_some()
    }

    pub(crate) fn set_server_version(&mut self, version: ApiVersion) {
        self.server_version = Some(version);
    }

    /// Join a path (or absolute URL) onto the base URL
    pub fn url_for(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }
}
