pub mod app_config;
pub mod retry;
pub mod serde_util;
pub mod traits;
