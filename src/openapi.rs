use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::features::health::handler::liveness,
        crate::features::health::handler::health_check,
        crate::features::predict::handler::predict,
    ),
    components(
        schemas(
            crate::features::predict::PredictRequest,
            crate::features::predict::PredictResponse,
            crate::features::health::handler::HealthResponse,
            crate::error::ErrorBody,
        )
    ),
    tags(
        (
            name = "Predict",
            description = "专注度分析：上传 base64 图片，返回 concentration_index。"
        ),
        (name = "Health", description = "健康检查：服务探活。"),
    ),
    info(
        title = "Concentration Service API",
        version = env!("CARGO_PKG_VERSION"),
        description = "专注度指数服务 API（Axum + utoipa）。"
    )
)]
pub struct ApiDoc;
