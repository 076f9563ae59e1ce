use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    action_router::{ActionRouterInput, ActionRouterOutput},
    api::{
        error::ApiError,
        response::ApiResponse,
        validation::{validate_source, validate_window},
    },
    flows::processor_enums::{
        FlowSnapshot, FlowsProcessorInput, FlowsProcessorOutput, GetWindowInputArgs, SourceInfo,
        WindowSnapshot,
    },
    utils::app_config::AppConfig,
};

async fn route(app_config: AppConfig, input: FlowsProcessorInput) -> Result<FlowsProcessorOutput, ApiError> {
    let action = ActionRouterInput::Flows(input);

    match action.process(app_config).await? {
        ActionRouterOutput::Flows(output) => Ok(output),
    }
}

/// GET /api/:source - Every window of a source
pub async fn get_flows(
    State(app_config): State<AppConfig>,
    Path(source): Path<String>,
) -> Result<(StatusCode, Json<FlowSnapshot>), ApiError> {
    let source = validate_source(&source)?;

    match route(app_config, FlowsProcessorInput::GetWindows(source)).await? {
        FlowsProcessorOutput::GetWindows(snapshot) => Ok((StatusCode::OK, Json(snapshot))),
        _ => Err(ApiError::internal_error("Unexpected response type")),
    }
}

/// GET /api/:source/:window - A single window of a source
pub async fn get_flow_window(
    State(app_config): State<AppConfig>,
    Path((source, window)): Path<(String, String)>,
) -> Result<(StatusCode, Json<WindowSnapshot>), ApiError> {
    let source = validate_source(&source)?;
    let window = validate_window(&window)?;

    let input = FlowsProcessorInput::GetWindow(GetWindowInputArgs { source, window });

    match route(app_config, input).await? {
        FlowsProcessorOutput::GetWindow(snapshot) => Ok((StatusCode::OK, Json(snapshot))),
        _ => Err(ApiError::internal_error("Unexpected response type")),
    }
}

/// GET /api/sources - Served sources with their routes and freshness
pub async fn get_sources(
    State(app_config): State<AppConfig>,
) -> Result<(StatusCode, Json<ApiResponse<Vec<SourceInfo>>>), ApiError> {
    match route(app_config, FlowsProcessorInput::ListSources).await? {
        FlowsProcessorOutput::ListSources(sources) => Ok((StatusCode::OK, Json(ApiResponse::success(sources)))),
        _ => Err(ApiError::internal_error("Unexpected response type")),
    }
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use clap::Parser;
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::api::build_router;
    use crate::utils::app_config::{AppConfig, AppSettings};

    fn offline_app_config() -> AppConfig {
        let mut settings = AppSettings::parse_from(["flow-tracker-back-end"]);
        settings.price_url = None;
        settings.exchange_feed_url = None;
        settings.bridge_feed_url = None;
        settings.swap_feed_url = None;
        settings.max_retries = 0;
        AppConfig::new(settings).unwrap()
    }

    async fn get(uri: &str) -> anyhow::Result<(u16, Value)> {
        let router = build_router(offline_app_config());
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty())?)
            .await?;

        let status = response.status().as_u16();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        Ok((status, serde_json::from_slice(&bytes)?))
    }

    #[tokio::test]
    async fn test_health() -> anyhow::Result<()> {
        let (status, body) = get("/health").await?;
        assert_eq!(status, 200);
        assert_eq!(body["status"], "ok");
        Ok(())
    }

    #[tokio::test]
    async fn test_unconfigured_upstream_still_serves_every_window() -> anyhow::Result<()> {
        let (status, body) = get("/api/inflow").await?;

        assert_eq!(status, 200);
        assert_eq!(body["status"], "fallback");
        assert!(body["error"].is_string());
        assert!(body["avaxPrice"].is_number());
        assert!(body["lastUpdated"].is_string());
        assert_eq!(body["1h"].as_array().unwrap().len(), 4);
        assert_eq!(body["6h"].as_array().unwrap().len(), 24);
        assert_eq!(body["12h"].as_array().unwrap().len(), 48);
        assert_eq!(body["24h"].as_array().unwrap().len(), 96);

        let first = &body["1h"][0];
        for field in ["time", "exchangeAmount", "solBridgeAmount", "ethBridgeAmount", "totalInflow", "usdValue"] {
            assert!(first.get(field).is_some(), "missing {}", field);
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_bridge_has_no_price() -> anyhow::Result<()> {
        let (status, body) = get("/api/bridge").await?;
        assert_eq!(status, 200);
        assert!(body.get("avaxPrice").is_none());
        assert!(body["1h"][0].get("totalBridged").is_some());
        Ok(())
    }

    #[tokio::test]
    async fn test_single_window() -> anyhow::Result<()> {
        let (status, body) = get("/api/swap/12h").await?;
        assert_eq!(status, 200);
        assert_eq!(body["window"], "12h");
        assert_eq!(body["records"].as_array().unwrap().len(), 48);
        assert!(body["records"][0].get("totalVolume").is_some());
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_window_is_bad_request() -> anyhow::Result<()> {
        let (status, body) = get("/api/inflow/90m").await?;
        assert_eq!(status, 400);
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("90m"));
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_source_is_not_found() -> anyhow::Result<()> {
        let (status, _) = get("/api/ledger").await?;
        assert_eq!(status, 404);
        Ok(())
    }

    #[tokio::test]
    async fn test_sources_listing() -> anyhow::Result<()> {
        let (status, body) = get("/api/sources").await?;
        assert_eq!(status, 200);
        assert_eq!(body["data"].as_array().unwrap().len(), 3);
        assert_eq!(body["data"][0]["route"], "/api/inflow");
        Ok(())
    }
}
