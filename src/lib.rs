//! Client library for the stackdio cloud orchestration REST API.
//!
//! Public API layers:
//! - [`StackdioClient`]: session-bound client; resource operations are
//!   grouped per family under [`resource`].
//! - [`api`]: the dispatch layer (endpoint templates, version gate, transport).
//! - [`Error`]: unified error type used by every operation.

pub mod api;
pub mod config;
pub mod resource;

pub use api::auth::{AuthLevel, Credentials, Session};
pub use api::client::StackdioClient;
pub use api::error::{Error, Result};
pub use api::version::{ApiVersion, CLIENT_VERSION};
pub use resource::settings::PublicKey;
pub use resource::stack::{LogDate, LogLevel, LogType};
