pub mod time_series;
pub mod aggregation_block;
pub mod processor;
pub mod config;

// Re-export commonly used types
pub use aggregation_block::{AggregateRecord, AggregationPlan, Category, RawEvent, aggregate};
pub use time_series::{Bucket, WindowKey, build_buckets, buckets_for_window, truncate_to_hour};
pub use config::AggregatorsConfig;
pub use processor::{AggregateWindowsInputArgs, WindowedResult, build_windowed_result};
