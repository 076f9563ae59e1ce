use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::aggregators::aggregation_block::{AggregateRecord, AggregationPlan, RawEvent, aggregate};
use crate::aggregators::config::AggregatorsConfig;
use crate::aggregators::time_series::{WindowKey, build_buckets};
use crate::errors::FlowError;

/// Every window of one data source, materialized together.
#[derive(Serialize, Clone, Debug, Default, PartialEq)]
pub struct WindowedResult {
    #[serde(flatten)]
    pub windows: BTreeMap<WindowKey, Vec<AggregateRecord>>,
    /// Only set for sources that publish the price they valued amounts at
    #[serde(rename = "avaxPrice", skip_serializing_if = "Option::is_none")]
    pub reference_price: Option<f64>,
}

impl WindowedResult {
    pub fn window(&self, key: WindowKey) -> Option<&[AggregateRecord]> {
        self.windows.get(&key).map(|records| records.as_slice())
    }
}

/// Inputs to one refresh of a data source.
pub struct AggregateWindowsInputArgs<'a> {
    pub events: &'a [RawEvent],
    pub now: DateTime<Utc>,
    pub plan: &'a AggregationPlan,
    /// Price used for the usd field
    pub reference_price: Option<f64>,
    /// Whether `reference_price` is echoed in the result
    pub publish_price: bool,
}

/// Runs the bucketer and the aggregator for every configured window.
pub fn build_windowed_result(
    args: AggregateWindowsInputArgs<'_>,
    config: &AggregatorsConfig,
) -> Result<WindowedResult, FlowError> {
    let mut windows = BTreeMap::new();

    for window in &config.windows {
        let buckets = build_buckets(args.now, window.duration(), config.bucket_width())?;
        let records = aggregate(args.events, &buckets, args.plan, args.reference_price);
        windows.insert(*window, records);
    }

    tracing::debug!(
        events = args.events.len(),
        windows = windows.len(),
        "aggregated windows"
    );

    Ok(WindowedResult {
        windows,
        reference_price: if args.publish_price {
            args.reference_price
        } else {
            None
        },
    })
}
