use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::aggregators::time_series::Bucket;
use crate::utils::serde_util;

/// A timestamped occurrence reported by an upstream feed (transfer, bridge hop, swap).
#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct RawEvent {
    #[serde(deserialize_with = "serde_util::epoch_flexible::deserialize")]
    pub timestamp: DateTime<Utc>,
    /// Source chain, venue or trade side
    #[serde(alias = "chain", alias = "venue", alias = "side")]
    pub tag: String,
    #[serde(deserialize_with = "serde_util::number_or_string::deserialize")]
    pub amount: f64,
}

impl RawEvent {
    pub fn new(timestamp: DateTime<Utc>, tag: impl Into<String>, amount: f64) -> Self {
        Self {
            timestamp,
            tag: tag.into(),
            amount,
        }
    }

    pub fn tag_is(&self, tag: &str) -> bool {
        self.tag.eq_ignore_ascii_case(tag)
    }
}

/// One named sum inside a bucket and the events that feed it.
#[derive(Clone, Copy, Debug)]
pub struct Category {
    pub name: &'static str,
    pub matches: fn(&RawEvent) -> bool,
}

impl Category {
    pub const fn new(name: &'static str, matches: fn(&RawEvent) -> bool) -> Self {
        Self { name, matches }
    }
}

/// Describes the record schema of a data source.
#[derive(Clone, Debug)]
pub struct AggregationPlan {
    pub categories: Vec<Category>,
    /// Sum of every category
    pub total_field: &'static str,
    /// `total_field` valued at the reference price
    pub usd_field: Option<&'static str>,
}

impl AggregationPlan {
    /// Field names in the order they appear in a record, `time` excluded.
    pub fn field_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.categories.iter().map(|c| c.name).collect();
        names.push(self.total_field);
        if let Some(usd) = self.usd_field {
            names.push(usd);
        }
        names
    }
}

/// The reduced view of one bucket.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct AggregateRecord {
    /// Bucket start, ISO-8601 in UTC
    pub time: String,
    #[serde(flatten)]
    pub values: IndexMap<&'static str, f64>,
}

impl AggregateRecord {
    pub fn value(&self, field: &str) -> f64 {
        self.values.get(field).copied().unwrap_or(0.0)
    }
}

pub fn format_bucket_time(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Reduces `events` into one record per bucket, in bucket order.
///
/// Events are sorted once and each bucket's slice is located by binary search.
/// Membership is half-open, so an event sitting on a boundary lands in the more
/// recent bucket only. Totals are derived from the category sums afterwards.
pub fn aggregate(
    events: &[RawEvent],
    buckets: &[Bucket],
    plan: &AggregationPlan,
    reference_price: Option<f64>,
) -> Vec<AggregateRecord> {
    let mut sorted: Vec<&RawEvent> = events.iter().collect();
    sorted.sort_by_key(|e| e.timestamp);

    buckets
        .iter()
        .map(|bucket| {
            let lo = sorted.partition_point(|e| e.timestamp < bucket.start);
            let hi = sorted.partition_point(|e| e.timestamp < bucket.end);
            let in_bucket = &sorted[lo..hi];

            let mut values: IndexMap<&'static str, f64> = IndexMap::with_capacity(plan.categories.len() + 2);
            for category in &plan.categories {
                let sum = in_bucket
                    .iter()
                    .filter(|e| (category.matches)(**e))
                    .fold(0.0, |acc, e| acc + e.amount);
                values.insert(category.name, sum);
            }

            let total: f64 = values.values().sum();
            values.insert(plan.total_field, total);

            if let Some(usd_field) = plan.usd_field {
                values.insert(usd_field, total * reference_price.unwrap_or(0.0));
            }

            AggregateRecord {
                time: format_bucket_time(bucket.start),
                values,
            }
        })
        .collect()
}
