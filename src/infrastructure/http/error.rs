//! HTTP Error Handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::application::PipelineError;

/// 统一错误响应格式
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub errno: i32,
    pub error: String,
    pub data: Option<()>,
}

impl ErrorResponse {
    pub fn new(errno: i32, error: impl Into<String>) -> Self {
        Self {
            errno,
            error: error.into(),
            data: None,
        }
    }
}

/// 错误码定义
pub mod errno {
    pub const BAD_REQUEST: i32 = 400;
    pub const NOT_FOUND: i32 = 404;
    pub const INTERNAL_ERROR: i32 = 500;
    pub const SERVICE_UNAVAILABLE: i32 = 503;
}

/// API 错误
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Internal(String),
    ServiceUnavailable(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let response = match &self {
            ApiError::NotFound(msg) => {
                tracing::warn!(errno = errno::NOT_FOUND, error = %msg, "Resource not found");
                ErrorResponse::new(errno::NOT_FOUND, msg.clone())
            }
            ApiError::BadRequest(msg) => {
                tracing::warn!(errno = errno::BAD_REQUEST, error = %msg, "Bad request");
                ErrorResponse::new(errno::BAD_REQUEST, msg.clone())
            }
            ApiError::Internal(msg) => {
                tracing::error!(errno = errno::INTERNAL_ERROR, error = %msg, "Internal server error");
                ErrorResponse::new(errno::INTERNAL_ERROR, msg.clone())
            }
            ApiError::ServiceUnavailable(msg) => {
                tracing::error!(errno = errno::SERVICE_UNAVAILABLE, error = %msg, "Service unavailable");
                ErrorResponse::new(errno::SERVICE_UNAVAILABLE, msg.clone())
            }
        };

        // 业务错误统一 200 + errno
        (StatusCode::OK, Json(response)).into_response()
    }
}

impl From<PipelineError> for ApiError {
    fn from(e: PipelineError) -> Self {
        let message = e.to_string();
        match e {
            PipelineError::EngineUnavailable => ApiError::ServiceUnavailable(message),
            PipelineError::ModelNotFound(_) => ApiError::NotFound(message),
            PipelineError::MissingModel
            | PipelineError::InvalidParameter(_)
            | PipelineError::InvalidSourceAudio(_) => ApiError::BadRequest(message),
            PipelineError::ModelLoadFailed(_)
            | PipelineError::SynthesisFailed(_)
            | PipelineError::ConversionFailed(_) => ApiError::Internal(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_pipeline_error_mapping() {
        assert!(matches!(
            ApiError::from(PipelineError::EngineUnavailable),
            ApiError::ServiceUnavailable(_)
        ));
        assert!(matches!(
            ApiError::from(PipelineError::ModelNotFound(PathBuf::from("pth/x.pth"))),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            ApiError::from(PipelineError::MissingModel),
            ApiError::BadRequest(_)
        ));
        assert!(matches!(
            ApiError::from(PipelineError::ConversionFailed("oom".into())),
            ApiError::Internal(msg) if msg.contains("oom")
        ));
    }
}
