use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::aggregators::{AggregateRecord, WindowKey, WindowedResult};
use crate::aggregators::aggregation_block::format_bucket_time;
use crate::flows::sources::DataSource;
use crate::result_cache::CacheLookup;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct GetWindowInputArgs {
    pub source: DataSource,
    pub window: WindowKey,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub enum FlowsProcessorInput {
    /// Every window of a source, served through the cache
    GetWindows(DataSource),
    /// A single window of a source, served through the cache
    GetWindow(GetWindowInputArgs),
    /// Drops the cached entry of a source and fetches it again
    ForceRefresh(DataSource),
    ListSources,
}

/// Boundary payload for a whole source.
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct FlowSnapshot {
    #[serde(skip)]
    pub source: DataSource,
    #[serde(flatten)]
    pub data: Arc<WindowedResult>,
    pub last_updated: String,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FlowSnapshot {
    pub fn from_lookup(source: DataSource, lookup: CacheLookup) -> Self {
        Self {
            source,
            last_updated: format_bucket_time(lookup.computed_at),
            status: lookup.status.as_str(),
            error: lookup.error().map(str::to_string),
            data: lookup.result,
        }
    }
}

/// Boundary payload for one window of a source.
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct WindowSnapshot {
    #[serde(skip)]
    pub source: DataSource,
    pub window: WindowKey,
    pub records: Vec<AggregateRecord>,
    #[serde(rename = "avaxPrice", skip_serializing_if = "Option::is_none")]
    pub reference_price: Option<f64>,
    pub last_updated: String,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SourceInfo {
    pub source: DataSource,
    pub route: String,
    pub freshness_secs: i64,
    pub fields: Vec<&'static str>,
}

impl From<DataSource> for SourceInfo {
    fn from(source: DataSource) -> Self {
        Self {
            source,
            route: format!("/api/{}", source),
            freshness_secs: source.freshness().num_seconds(),
            fields: source.plan().field_names(),
        }
    }
}

#[derive(Serialize, Debug, Clone)]
pub enum FlowsProcessorOutput {
    GetWindows(FlowSnapshot),
    GetWindow(WindowSnapshot),
    ForceRefresh(FlowSnapshot),
    ListSources(Vec<SourceInfo>),
}
