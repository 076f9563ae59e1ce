use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, anyhow};
use clap::Parser;
use dotenvy::dotenv;

use crate::flows::upstream::{DEFAULT_PRICE_URL, UpstreamClient, UpstreamEndpoints};
use crate::result_cache::ResultCache;

/// Upstream and runtime settings, read from flags or the environment.
#[derive(Parser, Clone, Debug)]
#[command(name = "flow-tracker-back-end", about = "Serves time-bucketed inflow, bridge and swap statistics")]
pub struct AppSettings {
    /// Address the HTTP server binds to
    #[clap(long, env = "API_BIND", default_value = "0.0.0.0")]
    pub bind: String,

    #[clap(long, env = "PORT", default_value_t = 6969)]
    pub port: u16,

    #[clap(long, env = "FLOW_PRICE_URL", default_value = DEFAULT_PRICE_URL)]
    pub price_url: Option<String>,

    #[clap(long, env = "FLOW_EXCHANGE_FEED_URL")]
    pub exchange_feed_url: Option<String>,

    #[clap(long, env = "FLOW_BRIDGE_FEED_URL")]
    pub bridge_feed_url: Option<String>,

    #[clap(long, env = "FLOW_SWAP_FEED_URL")]
    pub swap_feed_url: Option<String>,

    /// Per request timeout for upstream calls
    #[clap(long, env = "FLOW_HTTP_TIMEOUT_SECS", default_value_t = 10)]
    pub http_timeout_secs: u64,

    #[clap(long, env = "FLOW_RETRY_BASE_MS", default_value_t = 200)]
    pub retry_base_ms: u64,

    #[clap(long, env = "FLOW_MAX_RETRIES", default_value_t = 2)]
    pub max_retries: u32,
}

impl AppSettings {
    /// Settings from the environment only, ignoring process arguments.
    pub fn from_env() -> Result<Self> {
        let settings = Self::try_parse_from([env!("CARGO_PKG_NAME")])?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.http_timeout_secs == 0 {
            return Err(anyhow!("FLOW_HTTP_TIMEOUT_SECS must be greater than 0"));
        }
        Ok(())
    }

    pub fn endpoints(&self) -> UpstreamEndpoints {
        let non_empty = |url: &Option<String>| url.clone().filter(|u| !u.trim().is_empty());

        UpstreamEndpoints {
            price_url: non_empty(&self.price_url),
            exchange_feed_url: non_empty(&self.exchange_feed_url),
            bridge_feed_url: non_empty(&self.bridge_feed_url),
            swap_feed_url: non_empty(&self.swap_feed_url),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub settings: AppSettings,
    pub upstream: UpstreamClient,
    pub cache: Arc<ResultCache>,
}

impl AppConfig {
    pub fn new(settings: AppSettings) -> Result<Self> {
        settings.validate()?;

        let upstream = UpstreamClient::new(
            settings.endpoints(),
            Duration::from_secs(settings.http_timeout_secs),
            settings.retry_base_ms,
            settings.max_retries,
        )?;

        Ok(Self {
            settings,
            upstream,
            cache: Arc::new(ResultCache::new()),
        })
    }

    pub fn from_env() -> Result<Self> {
        let _ = dotenv();

        Self::new(AppSettings::from_env()?)
    }
}
