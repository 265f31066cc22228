use axum::{Router, extract::State, http::StatusCode, response::Json, routing::get};
use serde::Serialize;

use crate::state::AppState;

/// 存活检查的固定文案
pub const LIVENESS_TEXT: &str = "service running";

/// 健康检查响应
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    /// 服务状态
    #[schema(example = "healthy")]
    pub status: String,
    /// 服务名称
    #[schema(example = "concentration-service")]
    pub service: String,
    /// 当前版本（Cargo package version）
    #[schema(example = "0.1.0")]
    pub version: String,
    /// 当前使用的分析器
    #[schema(example = "remote")]
    pub analyzer: String,
}

#[utoipa::path(
    get,
    path = "/",
    summary = "存活检查",
    description = "返回纯文本，表示服务进程正在运行。",
    responses((status = 200, description = "服务运行中", body = String, content_type = "text/plain")),
    tag = "Health"
)]
pub async fn liveness() -> &'static str {
    LIVENESS_TEXT
}

#[utoipa::path(
    get,
    path = "/health",
    summary = "健康检查",
    description = "用于探活的健康检查端点，返回服务状态、版本与分析器信息。",
    responses((status = 200, description = "服务健康", body = HealthResponse)),
    tag = "Health"
)]
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            service: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            analyzer: state.analyzer.name().to_string(),
        }),
    )
}

pub fn create_health_router() -> Router<AppState> {
    Router::new()
        .route("/", get(liveness))
        .route("/health", get(health_check))
}
