use crate::aggregators::WindowKey;
use crate::api::error::ApiError;
use crate::flows::sources::DataSource;

pub fn validate_source(source: &str) -> Result<DataSource, ApiError> {
    source.parse::<DataSource>().map_err(ApiError::from)
}

pub fn validate_window(window: &str) -> Result<WindowKey, ApiError> {
    window.parse::<WindowKey>().map_err(ApiError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_source_and_window() {
        assert_eq!(validate_source("bridge").unwrap(), DataSource::Bridge);
        assert!(matches!(validate_source("ledger"), Err(ApiError::NotFound(_))));
        assert_eq!(validate_window("1h").unwrap(), WindowKey::OneHour);
        assert!(matches!(validate_window("90m"), Err(ApiError::BadRequest(_))));
    }
}
