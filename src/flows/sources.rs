use std::fmt;
use std::str::FromStr;

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::aggregators::{AggregationPlan, Category, RawEvent};
use crate::errors::FlowError;

pub const SOLANA_TAG: &str = "Solana";
pub const ETHEREUM_TAG: &str = "Ethereum";
pub const BUY_TAG: &str = "buy";
pub const SELL_TAG: &str = "sell";

/// Venues reported by the exchange feed. Only these count as exchange flow.
pub const EXCHANGE_TAGS: &[&str] = &["Binance", "Coinbase", "OKX", "Kraken", "Bybit"];

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DataSource {
    #[serde(rename = "inflow")]
    Inflow,
    #[serde(rename = "bridge")]
    Bridge,
    #[serde(rename = "swap")]
    Swap,
}

fn is_solana(e: &RawEvent) -> bool {
    e.tag_is(SOLANA_TAG)
}

fn is_ethereum(e: &RawEvent) -> bool {
    e.tag_is(ETHEREUM_TAG)
}

fn is_exchange(e: &RawEvent) -> bool {
    EXCHANGE_TAGS.iter().any(|venue| e.tag_is(venue))
}

fn is_buy(e: &RawEvent) -> bool {
    e.tag_is(BUY_TAG)
}

fn is_sell(e: &RawEvent) -> bool {
    e.tag_is(SELL_TAG)
}

impl DataSource {
    pub const ALL: [DataSource; 3] = [DataSource::Inflow, DataSource::Bridge, DataSource::Swap];

    pub fn as_str(&self) -> &'static str {
        match self {
            DataSource::Inflow => "inflow",
            DataSource::Bridge => "bridge",
            DataSource::Swap => "swap",
        }
    }

    /// Maximum age of a cached result before the next request refreshes it.
    pub fn freshness(&self) -> TimeDelta {
        match self {
            DataSource::Inflow | DataSource::Bridge => TimeDelta::minutes(15),
            DataSource::Swap => TimeDelta::hours(6),
        }
    }

    /// Whether the reference price is part of the response body.
    pub fn publishes_price(&self) -> bool {
        matches!(self, DataSource::Inflow)
    }

    pub fn plan(&self) -> AggregationPlan {
        match self {
            DataSource::Inflow => AggregationPlan {
                categories: vec![
                    Category::new("exchangeAmount", is_exchange),
                    Category::new("solBridgeAmount", is_solana),
                    Category::new("ethBridgeAmount", is_ethereum),
                ],
                total_field: "totalInflow",
                usd_field: Some("usdValue"),
            },
            DataSource::Bridge => AggregationPlan {
                categories: vec![
                    Category::new("solBridgeAmount", is_solana),
                    Category::new("ethBridgeAmount", is_ethereum),
                ],
                total_field: "totalBridged",
                usd_field: Some("usdValue"),
            },
            DataSource::Swap => AggregationPlan {
                categories: vec![
                    Category::new("buyVolume", is_buy),
                    Category::new("sellVolume", is_sell),
                ],
                total_field: "totalVolume",
                usd_field: Some("usdValue"),
            },
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataSource {
    type Err = FlowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "inflow" => Ok(DataSource::Inflow),
            "bridge" => Ok(DataSource::Bridge),
            "swap" => Ok(DataSource::Swap),
            other => Err(FlowError::UnknownSource(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_freshness_per_source() {
        assert_eq!(DataSource::Inflow.freshness(), TimeDelta::minutes(15));
        assert_eq!(DataSource::Bridge.freshness(), TimeDelta::minutes(15));
        assert_eq!(DataSource::Swap.freshness(), TimeDelta::hours(6));
    }

    #[test]
    fn test_inflow_plan_classifies_each_tag_once() {
        let plan = DataSource::Inflow.plan();
        for tag in ["Solana", "ethereum", "Binance", "okx"] {
            let event = RawEvent::new(Utc::now(), tag, 1.0);
            let hits = plan.categories.iter().filter(|c| (c.matches)(&event)).count();
            assert_eq!(hits, 1, "tag {}", tag);
        }
    }

    #[test]
    fn test_other_bridge_chains_are_not_exchange_flow() {
        let plan = DataSource::Inflow.plan();
        let exchange = plan.categories.iter().find(|c| c.name == "exchangeAmount").unwrap();

        assert!(!(exchange.matches)(&RawEvent::new(Utc::now(), "Arbitrum", 1.0)));
        assert!(!(exchange.matches)(&RawEvent::new(Utc::now(), "Solana", 1.0)));
        assert!((exchange.matches)(&RawEvent::new(Utc::now(), "Coinbase", 1.0)));
    }

    #[test]
    fn test_parse_source() {
        assert_eq!("Swap".parse::<DataSource>().unwrap(), DataSource::Swap);
        assert!(matches!(
            "prices".parse::<DataSource>(),
            Err(FlowError::UnknownSource(_))
        ));
    }
}
