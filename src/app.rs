use axum::{Router, extract::DefaultBodyLimit};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::AppConfig;
use crate::cors::build_cors_layer;
use crate::features::{health, predict};
use crate::openapi::ApiDoc;
use crate::request_id::request_id_middleware;
use crate::state::AppState;

/// 组装完整的 HTTP 应用：业务路由 + 文档 + 中间件
pub fn build_app(state: AppState, config: &AppConfig) -> Router {
    let mut app = Router::<AppState>::new()
        .merge(health::create_health_router())
        .merge(predict::create_predict_router())
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(DefaultBodyLimit::max(config.image.max_body_bytes))
        .with_state(state);

    if let Some(cors) = build_cors_layer(&config.cors) {
        app = app.layer(cors);
    } else {
        tracing::info!("CORS 未启用");
    }

    // request_id 放在最外层：CORS 直接应答的预检请求也要带上 x-request-id
    app.layer(axum::middleware::from_fn(request_id_middleware))
}
