//! Providers and provider types

use super::find_id_by;
use crate::api::client::{take_results, Operation, StackdioClient};
use crate::api::endpoint::PathArgs;
use crate::api::error::{Error, Result};
use crate::api::http::RequestOptions;
use serde::Serialize;
use serde_json::Value;

const LIST_PROVIDER_TYPES: Operation = Operation::get("list_provider_types", "provider_types/");
const SEARCH_PROVIDER_TYPES: Operation =
    Operation::get("search_provider_types", "provider_types/").accepted_versions(&[">=0.6.1"]);
const GET_PROVIDER_TYPE_ID: Operation = Operation::get("get_provider_type_id", "provider_types/")
    .accepted_versions(&["<0.7"])
    .deprecated();

const CREATE_PROVIDER: Operation = Operation::post("create_provider", "providers/").admin();
const LIST_PROVIDERS: Operation = Operation::get("list_providers", "providers/");
const GET_PROVIDER: Operation = Operation::get("get_provider", "providers/{provider_id}/");
const SEARCH_PROVIDERS: Operation =
    Operation::get("search_providers", "providers/").accepted_versions(&[">=0.6.1"]);
const DELETE_PROVIDER: Operation = Operation::delete("delete_provider", "providers/{provider_id}/");
const GET_PROVIDER_ID: Operation = Operation::get("get_provider_id", "providers/")
    .accepted_versions(&["<0.7"])
    .deprecated();

/// Fields accepted when creating a provider. Unset fields are sent as `null`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProviderForm {
    pub title: Option<String>,
    pub account_id: Option<String>,
    pub provider_type: Option<u64>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub keypair: Option<String>,
    pub security_groups: Option<String>,
    pub route53_domain: Option<String>,
    pub default_availability_zone: Option<u64>,
    pub private_key: Option<String>,
}

impl StackdioClient {
    /// List all provider types
    pub async fn list_provider_types(&self) -> Result<Vec<Value>> {
        self.invoke_results(&LIST_PROVIDER_TYPES, &PathArgs::new(), RequestOptions::new())
            .await
    }

    /// Provider types matching the given filters
    pub async fn search_provider_types(&self, filters: &[(&str, &str)]) -> Result<Vec<Value>> {
        self.invoke_results(
            &SEARCH_PROVIDER_TYPES,
            &PathArgs::new(),
            RequestOptions::new().query(filters),
        )
        .await
    }

    /// The provider type called `type_name` (e.g. `ec2`)
    pub async fn get_provider_type(&self, type_name: &str) -> Result<Value> {
        self.list_provider_types()
            .await?
            .into_iter()
            .find(|t| t.get("type_name").and_then(|v| v.as_str()) == Some(type_name))
            .ok_or_else(|| Error::lookup("Provider type", type_name))
    }

    /// Id of the provider type called `type_name`
    pub async fn get_provider_type_id(&self, type_name: &str) -> Result<u64> {
        let body: Value = self
            .invoke_json(&GET_PROVIDER_TYPE_ID, &PathArgs::new())
            .await?;
        let types = take_results(body)?;
        find_id_by(&types, "type_name", type_name, "Provider type")
    }

    /// Create a provider (requires admin credentials)
    pub async fn create_provider(&self, form: &ProviderForm) -> Result<Value> {
        let body = serde_json::to_value(form)?;
        self.invoke_json_with(
            &CREATE_PROVIDER,
            &PathArgs::new(),
            RequestOptions::new().json(body),
        )
        .await
    }

    /// List all providers
    pub async fn list_providers(&self) -> Result<Vec<Value>> {
        self.invoke_results(&LIST_PROVIDERS, &PathArgs::new(), RequestOptions::new())
            .await
    }

    /// The provider with the given id. With `none_on_404` a missing provider
    /// is `Ok(None)` instead of an error.
    pub async fn get_provider(&self, provider_id: u64, none_on_404: bool) -> Result<Option<Value>> {
        let args = PathArgs::new().arg("provider_id", provider_id);
        self.invoke_optional(&GET_PROVIDER, &args, none_on_404).await
    }

    /// Providers matching the given filters
    pub async fn search_providers(&self, filters: &[(&str, &str)]) -> Result<Vec<Value>> {
        self.invoke_results(
            &SEARCH_PROVIDERS,
            &PathArgs::new(),
            RequestOptions::new().query(filters),
        )
        .await
    }

    /// Delete a provider
    pub async fn delete_provider(&self, provider_id: u64) -> Result<Value> {
        let args = PathArgs::new().arg("provider_id", provider_id);
        self.invoke_json(&DELETE_PROVIDER, &args).await
    }

    /// Id of the provider whose slug (or title, with `by_title`) is `key`
    pub async fn get_provider_id(&self, key: &str, by_title: bool) -> Result<u64> {
        let body: Value = self.invoke_json(&GET_PROVIDER_ID, &PathArgs::new()).await?;
        let providers = take_results(body)?;
        let field = if by_title { "title" } else { "slug" };
        find_id_by(&providers, field, key, "Provider")
    }
}
