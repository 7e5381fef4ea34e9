//! User settings

use crate::api::client::{Operation, StackdioClient};
use crate::api::endpoint::PathArgs;
use crate::api::error::Result;
use crate::api::http::RequestOptions;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};

const SET_PUBLIC_KEY: Operation = Operation::put("set_public_key", "settings/");

/// Where a public key comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublicKey {
    /// The key material itself
    Inline(String),
    /// A file containing the key
    File(PathBuf),
}

impl PublicKey {
    /// Interpret a command-line argument: an existing file is read as a key
    /// file, anything else is taken as the key itself.
    pub fn from_arg(arg: &str) -> Self {
        if Path::new(arg).is_file() {
            PublicKey::File(PathBuf::from(arg))
        } else {
            PublicKey::Inline(arg.to_string())
        }
    }

    async fn contents(&self) -> Result<String> {
        match self {
            PublicKey::Inline(key) => Ok(key.clone()),
            PublicKey::File(path) => Ok(tokio::fs::read_to_string(path).await?),
        }
    }
}

impl StackdioClient {
    /// Upload the public key used for the current user's hosts. The key is
    /// sent exactly as given, trailing newline included.
    pub async fn set_public_key(&self, public_key: &PublicKey) -> Result<Value> {
        let key = public_key.contents().await?;
        self.invoke_json_with(
            &SET_PUBLIC_KEY,
            &PathArgs::new(),
            RequestOptions::new().json(json!({ "public_key": key })),
        )
        .await
    }
}
