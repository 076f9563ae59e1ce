use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::aggregators::RawEvent;
use crate::errors::FlowError;
use crate::utils::retry::ExponentialBackoffRetry;

pub const DEFAULT_PRICE_URL: &str =
    "https://api.coingecko.com/api/v3/simple/price?ids=avalanche-2&vs_currencies=usd";

/// Upstream event feeds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Feed {
    ExchangeTransfers,
    BridgeTransfers,
    Swaps,
}

impl Feed {
    pub fn as_str(&self) -> &'static str {
        match self {
            Feed::ExchangeTransfers => "exchange feed",
            Feed::BridgeTransfers => "bridge feed",
            Feed::Swaps => "swap feed",
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct UpstreamEndpoints {
    pub price_url: Option<String>,
    pub exchange_feed_url: Option<String>,
    pub bridge_feed_url: Option<String>,
    pub swap_feed_url: Option<String>,
}

impl UpstreamEndpoints {
    fn feed_url(&self, feed: Feed) -> Option<&str> {
        match feed {
            Feed::ExchangeTransfers => self.exchange_feed_url.as_deref(),
            Feed::BridgeTransfers => self.bridge_feed_url.as_deref(),
            Feed::Swaps => self.swap_feed_url.as_deref(),
        }
    }
}

/// Feeds answer either with a bare array or with `{"data": [...]}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum FeedResponse {
    List(Vec<RawEvent>),
    Wrapped { data: Vec<RawEvent> },
}

impl FeedResponse {
    fn into_events(self) -> Vec<RawEvent> {
        match self {
            FeedResponse::List(events) | FeedResponse::Wrapped { data: events } => events,
        }
    }
}

/// Pulls the first `usd` quote out of a CoinGecko style `{"<coin>": {"usd": n}}` body.
pub fn parse_price_body(body: &serde_json::Value) -> Option<f64> {
    body.as_object()?
        .values()
        .find_map(|quote| quote.get("usd").and_then(|usd| usd.as_f64()))
}

/// HTTP access to the price API and the event feeds.
#[derive(Clone, Debug)]
pub struct UpstreamClient {
    http: reqwest::Client,
    endpoints: UpstreamEndpoints,
    retry_base_ms: u64,
    max_retries: u32,
}

impl UpstreamClient {
    pub fn new(
        endpoints: UpstreamEndpoints,
        timeout: Duration,
        retry_base_ms: u64,
        max_retries: u32,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            http,
            endpoints,
            retry_base_ms,
            max_retries,
        })
    }

    pub fn endpoints(&self) -> &UpstreamEndpoints {
        &self.endpoints
    }

    fn retry(&self) -> ExponentialBackoffRetry {
        ExponentialBackoffRetry::new(self.retry_base_ms, self.max_retries)
    }

    /// Current USD reference price.
    pub async fn fetch_price(&self) -> Result<f64> {
        let url = self
            .endpoints
            .price_url
            .as_deref()
            .ok_or_else(|| FlowError::upstream("price url not configured"))?;

        let price = self
            .retry()
            .execute("price", || self.get_price_once(url))
            .await
            .map_err(|e| FlowError::upstream(format!("{:#}", e)))?;

        tracing::debug!(price, "fetched reference price");
        Ok(price)
    }

    /// Events of `feed` not older than `since`.
    pub async fn fetch_events(&self, feed: Feed, since: DateTime<Utc>) -> Result<Vec<RawEvent>> {
        let url = self
            .endpoints
            .feed_url(feed)
            .ok_or_else(|| FlowError::upstream(format!("{} url not configured", feed.as_str())))?;

        let since_ms = since.timestamp_millis().to_string();

        let events = self
            .retry()
            .execute(feed.as_str(), || self.get_feed_once(url, &since_ms))
            .await
            .map_err(|e| FlowError::upstream(format!("{:#}", e)))?;

        tracing::debug!(feed = feed.as_str(), count = events.len(), "fetched events");
        Ok(events)
    }

    async fn get_price_once(&self, url: &str) -> Result<f64> {
        let body: serde_json::Value = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let price = parse_price_body(&body)
            .ok_or_else(|| FlowError::upstream(format!("no usd quote in price response: {}", body)))?;

        Ok(price)
    }

    async fn get_feed_once(&self, url: &str, since_ms: &str) -> Result<Vec<RawEvent>> {
        let response: FeedResponse = self
            .http
            .get(url)
            .query(&[("since", since_ms)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response.into_events())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn offline_client() -> UpstreamClient {
        UpstreamClient::new(UpstreamEndpoints::default(), Duration::from_secs(1), 1, 0).unwrap()
    }

    #[test]
    fn test_parse_price_body() {
        assert_eq!(parse_price_body(&json!({"avalanche-2": {"usd": 27.35}})), Some(27.35));
        assert_eq!(parse_price_body(&json!({"avalanche-2": {"eur": 25.0}})), None);
        assert_eq!(parse_price_body(&json!([1, 2])), None);
    }

    #[test]
    fn test_feed_response_shapes() -> anyhow::Result<()> {
        let bare: FeedResponse =
            serde_json::from_value(json!([{"timestamp": 1709251200, "chain": "Solana", "amount": 3}]))?;
        let wrapped: FeedResponse =
            serde_json::from_value(json!({"data": [{"timestamp": 1709251200000i64, "tag": "buy", "amount": "4.5"}]}))?;

        assert_eq!(bare.into_events()[0].tag, "Solana");
        assert_eq!(wrapped.into_events()[0].amount, 4.5);
        Ok(())
    }

    #[tokio::test]
    async fn test_unconfigured_endpoints_fail_as_upstream_errors() {
        let client = offline_client();

        let price_err = client.fetch_price().await.unwrap_err();
        assert!(matches!(
            price_err.downcast_ref::<FlowError>(),
            Some(FlowError::UpstreamFetch(_))
        ));

        let feed_err = client
            .fetch_events(Feed::Swaps, Utc::now())
            .await
            .unwrap_err();
        assert!(feed_err.to_string().contains("swap feed url not configured"));
    }
}
