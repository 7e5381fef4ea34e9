//! stackdio API interaction module
//!
//! This module provides the dispatch layer that turns an operation
//! descriptor into an HTTP request.
//!
//! # Module Structure
//!
//! - [`auth`] - Credentials and the per-client session context
//! - [`client`] - Main client and generic operation dispatch
//! - [`endpoint`] - Endpoint template resolution
//! - [`error`] - Error taxonomy shared by all operations
//! - [`http`] - HTTP transport for REST API calls
//! - [`version`] - Server version parsing and version gating
//!
//! # Example
//!
//! ```ignore
//! use stackdio::api::{auth::Credentials, client::StackdioClient};
//!
//! async fn example() -> stackdio::Result<()> {
//!     let client = StackdioClient::connect(
//!         "https://stackdio.example.com/api/",
//!         Credentials::new("alice", "secret"),
//!     )
//!     .await?;
//!     let stacks = client.list_stacks().await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod endpoint;
pub mod error;
pub mod http;
pub mod version;
