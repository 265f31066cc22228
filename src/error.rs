use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::features::analysis::AnalyzerError;
use crate::features::predict::DecodeError;

/// 应用统一错误类型
///
/// 对外只暴露两类错误：调用方输入有误（400）与处理失败（500）。
#[derive(Error, Debug, utoipa::ToSchema)]
pub enum AppError {
    /// 请求体格式错误或缺少必需字段
    #[error("{0}")]
    BadRequest(String),

    /// 解码或分析阶段失败
    #[error("{0}")]
    Processing(String),
}

/// 错误响应体：只包含 `error` 字段。
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// 人类可读的错误信息
    #[schema(example = "no image data provided")]
    pub error: String,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Processing(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

// =============== Error conversions for internal errors ===============

impl From<DecodeError> for AppError {
    fn from(err: DecodeError) -> Self {
        AppError::Processing(err.to_string())
    }
}

impl From<AnalyzerError> for AppError {
    fn from(err: AnalyzerError) -> Self {
        AppError::Processing(format!("error processing image: {err}"))
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Processing(format!("blocking task failed: {err}"))
    }
}
