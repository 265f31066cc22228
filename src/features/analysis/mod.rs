//! 专注度分析器
//!
//! 人脸检测与打分由外部实现，服务只依赖 [`Analyzer`] 这一能力。
//! 分析器在启动时构建一次，以 `Arc<dyn Analyzer>` 注入路由状态并在请求间共享，
//! 因此实现必须可并发调用。

pub mod fixed;
pub mod remote;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::config::{AnalyzerConfig, AnalyzerKind};
use crate::features::predict::PixelArray;

pub use fixed::FixedAnalyzer;
pub use remote::RemoteAnalyzer;

/// 分析器错误类型
#[derive(Error, Debug)]
pub enum AnalyzerError {
    /// 网络请求错误
    #[error("network error: {0}")]
    Network(String),

    /// 上游请求超时
    #[error("analyzer timed out")]
    Timeout,

    /// 上游返回错误
    #[error("{0}")]
    Upstream(String),

    /// 上游响应无法解析
    #[error("invalid analyzer response: {0}")]
    InvalidResponse(String),

    /// 分数不是有限数值
    #[error("analyzer returned a non-finite score: {0}")]
    InvalidScore(String),

    /// 配置错误（仅在构建阶段出现）
    #[error("invalid analyzer config: {0}")]
    Config(String),
}

impl From<reqwest::Error> for AnalyzerError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AnalyzerError::Timeout
        } else if err.is_decode() {
            AnalyzerError::InvalidResponse(err.to_string())
        } else {
            AnalyzerError::Network(err.to_string())
        }
    }
}

/// 根据 BGR 像素数组计算专注度指数
#[async_trait]
pub trait Analyzer: Send + Sync {
    /// 分析器名称（用于健康检查与日志）
    fn name(&self) -> &'static str;

    async fn detect_face(&self, image: &PixelArray) -> Result<f64, AnalyzerError>;
}

/// 按配置构建分析器
pub fn build_analyzer(config: &AnalyzerConfig) -> Result<Arc<dyn Analyzer>, AnalyzerError> {
    let analyzer: Arc<dyn Analyzer> = match config.kind {
        AnalyzerKind::Remote => Arc::new(RemoteAnalyzer::new(
            &config.endpoint,
            config.timeout_duration(),
        )?),
        AnalyzerKind::Fixed => Arc::new(FixedAnalyzer::new(config.fixed_score)?),
    };
    tracing::info!("分析器已初始化: {}", analyzer.name());
    Ok(analyzer)
}
