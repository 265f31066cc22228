use std::time::Duration;

use reqwest::Url;
use thiserror::Error;

use crate::config::{AnalyzerKind, AppConfig};

/// 远程分析器连通性探测超时
const ANALYZER_PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// 启动检查错误
#[derive(Error, Debug)]
pub enum StartupError {
    #[error("配置无效: {0}")]
    InvalidConfig(String),
}

/// 执行启动检查
///
/// 1. 校验配置（监听地址、请求体上限、日志格式、分析器参数）
/// 2. 探测远程分析器连通性（仅告警，不阻断启动）
pub async fn run_startup_checks(config: &AppConfig) -> Result<(), StartupError> {
    tracing::info!("🔍 开始执行启动检查...");

    validate_config(config)?;

    if config.analyzer.kind == AnalyzerKind::Remote {
        probe_remote_analyzer(&config.analyzer.endpoint).await;
    }

    tracing::info!("✅ 启动检查完成");
    Ok(())
}

/// 校验配置项；不做任何 IO
pub fn validate_config(config: &AppConfig) -> Result<(), StartupError> {
    if config.server.host.trim().is_empty() {
        return Err(StartupError::InvalidConfig("server.host 不能为空".into()));
    }

    if config.image.max_body_bytes == 0 {
        return Err(StartupError::InvalidConfig(
            "image.max_body_bytes 必须大于 0".into(),
        ));
    }

    if !matches!(config.logging.format.as_str(), "full" | "compact") {
        return Err(StartupError::InvalidConfig(format!(
            "logging.format 仅支持 full|compact，当前为 {:?}",
            config.logging.format
        )));
    }

    match config.analyzer.kind {
        AnalyzerKind::Remote => {
            let url = Url::parse(&config.analyzer.endpoint).map_err(|e| {
                StartupError::InvalidConfig(format!(
                    "analyzer.endpoint 无法解析 {:?}: {e}",
                    config.analyzer.endpoint
                ))
            })?;
            if url.host_str().is_none() {
                return Err(StartupError::InvalidConfig(
                    "analyzer.endpoint 缺少主机名".into(),
                ));
            }
        }
        AnalyzerKind::Fixed => {
            if !config.analyzer.fixed_score.is_finite() {
                return Err(StartupError::InvalidConfig(
                    "analyzer.fixed_score 必须是有限数值".into(),
                ));
            }
            tracing::warn!(
                "⚠️ 使用固定分数分析器（fixed_score = {}），仅适用于本地联调",
                config.analyzer.fixed_score
            );
        }
    }

    Ok(())
}

/// TCP 探测远程分析器地址是否可达
async fn probe_remote_analyzer(endpoint: &str) {
    let Some(addr) = Url::parse(endpoint).ok().and_then(|u| {
        let host = u.host_str()?.to_string();
        let port = u.port_or_known_default()?;
        Some(format!("{host}:{port}"))
    }) else {
        return;
    };

    match tokio::time::timeout(
        ANALYZER_PROBE_TIMEOUT,
        tokio::net::TcpStream::connect(&addr),
    )
    .await
    {
        Ok(Ok(_)) => tracing::info!("✅ 远程分析器可达: {}", addr),
        Ok(Err(e)) => tracing::warn!("⚠️ 远程分析器暂不可达 {}: {}（请求将返回 500）", addr, e),
        Err(_) => tracing::warn!("⚠️ 远程分析器连接超时: {}", addr),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalyzerConfig;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&AppConfig::default()).is_ok());
    }

    #[test]
    fn rejects_unknown_log_format() {
        let mut config = AppConfig::default();
        config.logging.format = "xml".into();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn rejects_zero_body_limit() {
        let mut config = AppConfig::default();
        config.image.max_body_bytes = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn rejects_unparsable_remote_endpoint() {
        let config = AppConfig {
            analyzer: AnalyzerConfig {
                endpoint: "::not-a-url".into(),
                ..AnalyzerConfig::default()
            },
            ..AppConfig::default()
        };
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn fixed_analyzer_ignores_endpoint() {
        let config = AppConfig {
            analyzer: AnalyzerConfig {
                kind: AnalyzerKind::Fixed,
                endpoint: String::new(),
                fixed_score: 0.5,
                ..AnalyzerConfig::default()
            },
            ..AppConfig::default()
        };
        assert!(validate_config(&config).is_ok());
    }

    #[tokio::test]
    async fn unreachable_analyzer_does_not_block_startup() {
        let mut config = AppConfig::default();
        config.analyzer.endpoint = "http://127.0.0.1:9/analyze".into();
        assert!(run_startup_checks(&config).await.is_ok());
    }
}
