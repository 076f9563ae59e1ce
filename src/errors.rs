use thiserror::Error;

/// Failure kinds callers branch on. Everything else travels as `anyhow::Error`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FlowError {
    #[error("upstream fetch failed: {0}")]
    UpstreamFetch(String),

    #[error("invalid window: {0}")]
    InvalidWindow(String),

    /// Never surfaced to the boundary, the fallback result covers it.
    #[error("no cached result for {0}")]
    EmptyCache(String),

    #[error("unknown data source: {0}")]
    UnknownSource(String),
}

impl FlowError {
    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::UpstreamFetch(msg.into())
    }

    pub fn invalid_window(msg: impl Into<String>) -> Self {
        Self::InvalidWindow(msg.into())
    }
}
