//! Synthetic data served when a source has never produced a real result.
//!
//! The generated events go through the same bucketer and aggregator as real
//! ones, so the records keep every invariant of the live schema.

use chrono::{DateTime, TimeDelta, Utc};
use rand::Rng;

use crate::aggregators::{AggregatorsConfig, RawEvent, WindowedResult};
use crate::flows::producers::{aggregate_source, lookback_start};
use crate::flows::sources::{BUY_TAG, DataSource, ETHEREUM_TAG, EXCHANGE_TAGS, SELL_TAG, SOLANA_TAG};

const SYNTHETIC_PRICE_RANGE: std::ops::Range<f64> = 20.0..40.0;

/// Events per 15 minute slot, per tag.
const MAX_EVENTS_PER_SLOT: u32 = 3;

fn amount_range(source: DataSource, tag: &str) -> std::ops::Range<f64> {
    match source {
        DataSource::Inflow if EXCHANGE_TAGS.contains(&tag) => 1_000.0..50_000.0,
        DataSource::Inflow | DataSource::Bridge => 500.0..20_000.0,
        DataSource::Swap => 100.0..10_000.0,
    }
}

fn tags(source: DataSource) -> Vec<&'static str> {
    match source {
        DataSource::Inflow => {
            let mut tags = EXCHANGE_TAGS.to_vec();
            tags.extend([SOLANA_TAG, ETHEREUM_TAG]);
            tags
        }
        DataSource::Bridge => vec![SOLANA_TAG, ETHEREUM_TAG],
        DataSource::Swap => vec![BUY_TAG, SELL_TAG],
    }
}

/// Random events spread over the whole lookback of `source`.
pub fn synthetic_events<R: Rng>(source: DataSource, now: DateTime<Utc>, rng: &mut R) -> Vec<RawEvent> {
    let start = lookback_start(now);
    let slot = TimeDelta::minutes(15);
    let slots = (crate::aggregators::truncate_to_hour(now) - start).num_minutes() / 15;
    let tags = tags(source);

    let mut events = Vec::new();
    for i in 0..slots {
        let slot_start = start + slot * i as i32;
        for tag in &tags {
            for _ in 0..rng.gen_range(0..=MAX_EVENTS_PER_SLOT) {
                let offset = TimeDelta::seconds(rng.gen_range(0..slot.num_seconds()));
                let amount = rng.gen_range(amount_range(source, tag));
                events.push(RawEvent::new(slot_start + offset, *tag, amount));
            }
        }
    }

    events
}

/// A schema-valid result for `source` built from synthetic events.
pub fn synthetic_result(source: DataSource, now: DateTime<Utc>, config: &AggregatorsConfig) -> WindowedResult {
    let mut rng = rand::thread_rng();
    let events = synthetic_events(source, now, &mut rng);
    let price = rng.gen_range(SYNTHETIC_PRICE_RANGE);

    match aggregate_source(source, &events, price, now, config) {
        Ok(result) => result,
        Err(e) => {
            tracing::error!(source = %source, error = %e, "synthetic aggregation failed, using default buckets");
            aggregate_source(source, &events, price, now, &AggregatorsConfig::default()).unwrap_or_default()
        }
    }
}
