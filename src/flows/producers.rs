use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::aggregators::{
    AggregateWindowsInputArgs, AggregatorsConfig, RawEvent, WindowKey, WindowedResult,
    build_windowed_result, truncate_to_hour,
};
use crate::flows::sources::DataSource;
use crate::flows::upstream::{Feed, UpstreamClient};

/// Oldest instant any window can reach for the given clock reading.
pub fn lookback_start(now: DateTime<Utc>) -> DateTime<Utc> {
    truncate_to_hour(now) - WindowKey::longest().duration()
}

/// Fetches everything `source` needs concurrently and aggregates it.
pub async fn produce(
    source: DataSource,
    upstream: &UpstreamClient,
    now: DateTime<Utc>,
    config: &AggregatorsConfig,
) -> Result<WindowedResult> {
    let since = lookback_start(now);

    let (price, events): (f64, Vec<RawEvent>) = match source {
        DataSource::Inflow => {
            let (price, mut exchange, bridge) = tokio::try_join!(
                upstream.fetch_price(),
                upstream.fetch_events(Feed::ExchangeTransfers, since),
                upstream.fetch_events(Feed::BridgeTransfers, since),
            )?;
            exchange.extend(bridge);
            (price, exchange)
        }
        DataSource::Bridge => tokio::try_join!(
            upstream.fetch_price(),
            upstream.fetch_events(Feed::BridgeTransfers, since),
        )?,
        DataSource::Swap => tokio::try_join!(
            upstream.fetch_price(),
            upstream.fetch_events(Feed::Swaps, since),
        )?,
    };

    tracing::info!(
        source = %source,
        price,
        events = events.len(),
        "upstream fetch complete"
    );

    aggregate_source(source, &events, price, now, config)
}

/// Aggregation half of [`produce`], split out so it can run on any event set.
pub fn aggregate_source(
    source: DataSource,
    events: &[RawEvent],
    price: f64,
    now: DateTime<Utc>,
    config: &AggregatorsConfig,
) -> Result<WindowedResult> {
    let plan = source.plan();
    let result = build_windowed_result(
        AggregateWindowsInputArgs {
            events,
            now,
            plan: &plan,
            reference_price: Some(price),
            publish_price: source.publishes_price(),
        },
        config,
    )?;

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FlowError;
    use crate::flows::upstream::UpstreamEndpoints;
    use chrono::TimeZone;
    use std::time::Duration;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, h, m, 0).unwrap()
    }

    #[test]
    fn test_lookback_start_covers_longest_window() {
        assert_eq!(lookback_start(at(12, 40)), Utc.with_ymd_and_hms(2024, 2, 29, 12, 0, 0).unwrap());
    }

    #[test]
    fn test_inflow_aggregation_keeps_total_invariant() -> Result<()> {
        let events = vec![
            RawEvent::new(at(11, 5), "Binance", 100.0),
            RawEvent::new(at(11, 10), "Solana", 40.0),
            RawEvent::new(at(11, 20), "Ethereum", 60.0),
        ];

        let result = aggregate_source(DataSource::Inflow, &events, 30.0, at(12, 0), &AggregatorsConfig::default())?;
        assert_eq!(result.reference_price, Some(30.0));

        let hour = result.window(WindowKey::OneHour).unwrap();
        let oldest = &hour[3];
        assert_eq!(oldest.value("exchangeAmount"), 100.0);
        assert_eq!(oldest.value("solBridgeAmount"), 40.0);
        assert_eq!(oldest.value("totalInflow"), 140.0);
        assert_eq!(oldest.value("usdValue"), 4200.0);
        assert_eq!(hour[2].value("ethBridgeAmount"), 60.0);

        for records in result.windows.values() {
            for r in records {
                let parts = r.value("exchangeAmount") + r.value("solBridgeAmount") + r.value("ethBridgeAmount");
                assert_eq!(r.value("totalInflow"), parts);
            }
        }
        Ok(())
    }

    #[test]
    fn test_bridge_result_does_not_publish_price() -> Result<()> {
        let result = aggregate_source(DataSource::Bridge, &[], 30.0, at(12, 0), &AggregatorsConfig::default())?;
        assert_eq!(result.reference_price, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_produce_surfaces_upstream_failure() {
        let upstream = UpstreamClient::new(UpstreamEndpoints::default(), Duration::from_secs(1), 1, 0).unwrap();
        let err = produce(DataSource::Swap, &upstream, at(12, 0), &AggregatorsConfig::default())
            .await
            .unwrap_err();

        assert!(matches!(err.downcast_ref::<FlowError>(), Some(FlowError::UpstreamFetch(_))));
    }
}
