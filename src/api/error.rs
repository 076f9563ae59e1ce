use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::api::response::ApiResponse;
use crate::errors::FlowError;

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    InternalError(String),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn internal_error(msg: impl Into<String>) -> Self {
        Self::InternalError(msg.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::BadRequest(msg) => msg.clone(),
            ApiError::NotFound(msg) => format!("{} not found", msg),
            ApiError::InternalError(msg) => msg.clone(),
        }
    }
}

impl From<FlowError> for ApiError {
    fn from(err: FlowError) -> Self {
        match err {
            FlowError::InvalidWindow(_) => ApiError::bad_request(err.to_string()),
            FlowError::UnknownSource(source) => ApiError::not_found(format!("Data source '{}'", source)),
            FlowError::UpstreamFetch(_) | FlowError::EmptyCache(_) => ApiError::internal_error(err.to_string()),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<FlowError>() {
            Ok(flow) => flow.into(),
            Err(other) => ApiError::internal_error(format!("{:#}", other)),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(status = %status, error = %self.message(), "request failed");
        }
        let error_response = ApiResponse::<serde_json::Value>::error(self.message());

        (status, Json(error_response)).into_response()
    }
}
