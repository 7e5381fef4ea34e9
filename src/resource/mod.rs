//! Resource families
//!
//! Each submodule adds one family of operations to [`StackdioClient`]
//! (`impl` blocks), built on the generic dispatch in [`crate::api::client`].
//!
//! - [`provider`] - Cloud providers and provider types
//! - [`region`] - Regions and availability zones
//! - [`settings`] - Per-user settings (public key)
//! - [`stack`] - Stacks, hosts, logs, actions and access rules
//!
//! [`StackdioClient`]: crate::api::client::StackdioClient

pub mod provider;
pub mod region;
pub mod settings;
pub mod stack;

use crate::api::client::entity_id;
use crate::api::error::{Error, Result};
use serde_json::Value;

/// Id of the first entity whose `field` equals `key`
pub(crate) fn find_id_by(
    entities: &[Value],
    field: &str,
    key: &str,
    kind: &'static str,
) -> Result<u64> {
    entities
        .iter()
        .find(|entity| entity.get(field).and_then(|v| v.as_str()) == Some(key))
        .map(entity_id)
        .unwrap_or_else(|| Err(Error::lookup(kind, key)))
}
