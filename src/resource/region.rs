//! Regions and availability zones

use crate::api::client::{entity_id, take_results, Operation, StackdioClient};
use crate::api::endpoint::PathArgs;
use crate::api::error::{Error, Result};
use crate::api::http::RequestOptions;
use crate::api::version;
use serde_json::Value;

const LIST_REGIONS: Operation =
    Operation::get("list_regions", "regions/").accepted_versions(&[">=0.6.1"]);
const GET_REGION: Operation = Operation::get("get_region", "regions/{region_id}");
const SEARCH_REGIONS: Operation =
    Operation::get("search_regions", "regions/").accepted_versions(&[">=0.6.1"]);
const GET_REGION_ID: Operation = Operation::get("get_region_id", "regions/")
    .accepted_versions(&[">=0.6", "<0.7"])
    .deprecated();

const LIST_ZONES: Operation = Operation::get("list_zones", "zones/").accepted_versions(&["!=0.6"]);
const GET_ZONE: Operation = Operation::get("get_zone", "zones/{zone_id}");
const SEARCH_ZONES: Operation =
    Operation::get("search_zones", "zones/").accepted_versions(&[">=0.6.1"]);
const GET_ZONE_ID: Operation = Operation::get("get_zone_id", "zones/")
    .accepted_versions(&["!=0.6", "<0.7"])
    .deprecated();

impl StackdioClient {
    /// List all regions
    pub async fn list_regions(&self) -> Result<Vec<Value>> {
        self.invoke_results(&LIST_REGIONS, &PathArgs::new(), RequestOptions::new())
            .await
    }

    /// The region with the given id, or `None` on 404 when `none_on_404` is set
    pub async fn get_region(&self, region_id: u64, none_on_404: bool) -> Result<Option<Value>> {
        let args = PathArgs::new().arg("region_id", region_id);
        self.invoke_optional(&GET_REGION, &args, none_on_404).await
    }

    /// Regions matching the given filters
    pub async fn search_regions(&self, filters: &[(&str, &str)]) -> Result<Vec<Value>> {
        self.invoke_results(
            &SEARCH_REGIONS,
            &PathArgs::new(),
            RequestOptions::new().query(filters),
        )
        .await
    }

    /// Id of the region titled `title` for the provider type `type_name`.
    /// Exactly one region must match.
    pub async fn get_region_id(&self, title: &str, type_name: &str) -> Result<u64> {
        // The provider type lookup below is ungated
        version::check_accepted(
            GET_REGION_ID.name,
            GET_REGION_ID.accepted_versions,
            self.server_version(),
        )?;

        let provider_type = self.get_provider_type(type_name).await?;
        let provider_type_id = entity_id(&provider_type)?;

        let options = RequestOptions::new().query(&[
            ("title", title.to_string()),
            ("provider_type", provider_type_id.to_string()),
        ]);
        let body: Value = self
            .invoke_json_with(&GET_REGION_ID, &PathArgs::new(), options)
            .await?;

        match take_results(body)?.as_slice() {
            [region] => entity_id(region),
            _ => Err(Error::lookup("Region", format!("{} for {}", title, type_name))),
        }
    }

    /// List all zones
    pub async fn list_zones(&self) -> Result<Vec<Value>> {
        self.invoke_results(&LIST_ZONES, &PathArgs::new(), RequestOptions::new())
            .await
    }

    /// The zone with the given id, or `None` on 404 when `none_on_404` is set
    pub async fn get_zone(&self, zone_id: u64, none_on_404: bool) -> Result<Option<Value>> {
        let args = PathArgs::new().arg("zone_id", zone_id);
        self.invoke_optional(&GET_ZONE, &args, none_on_404).await
    }

    /// Zones matching the given filters
    pub async fn search_zones(&self, filters: &[(&str, &str)]) -> Result<Vec<Value>> {
        self.invoke_results(
            &SEARCH_ZONES,
            &PathArgs::new(),
            RequestOptions::new().query(filters),
        )
        .await
    }

    /// Id of the zone titled `title` for the provider type `type_name`.
    ///
    /// Only servers before the 0.6 line accept this lookup, and their zones
    /// carry `provider_type` directly. Newer servers group zones under
    /// regions; use [`search_zones`](Self::search_zones) there.
    pub async fn get_zone_id(&self, title: &str, type_name: &str) -> Result<u64> {
        let body: Value = self.invoke_json(&GET_ZONE_ID, &PathArgs::new()).await?;
        let zones = take_results(body)?;
        let type_id = self.get_provider_type_id(type_name).await?;

        zones
            .iter()
            .find(|zone| {
                zone.get("title").and_then(|t| t.as_str()) == Some(title)
                    && zone.get("provider_type").and_then(|t| t.as_u64()) == Some(type_id)
            })
            .map(entity_id)
            .unwrap_or_else(|| Err(Error::lookup("Zone", format!("{} for {}", title, type_name))))
    }
}
