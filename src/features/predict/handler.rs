//! 专注度分析 API 处理模块

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    routing::get,
};
use std::time::Instant;
use tokio::sync::OwnedSemaphorePermit;

use crate::{
    error::AppError,
    features::analysis::AnalyzerError,
    state::AppState,
};

use super::decoder::{self, PixelArray};
use super::models::{PredictRequest, PredictResponse};

/// 计算专注度指数
#[utoipa::path(
    method(get, post),
    path = "/predict",
    summary = "计算专注度指数",
    description = "接收 base64 编码的图片，解码为 BGR 像素数组后交给分析器，返回单个浮点分数。GET 携带同样的请求体时按相同逻辑处理。",
    request_body = PredictRequest,
    responses(
        (status = 200, body = PredictResponse, description = "分析成功"),
        (
            status = 400,
            description = "请求体不是合法 JSON 或缺少 image 字段",
            body = crate::error::ErrorBody
        ),
        (
            status = 500,
            description = "base64 非法、图片无法识别或分析器失败",
            body = crate::error::ErrorBody
        )
    ),
    tag = "Predict"
)]
pub async fn predict(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<PredictResponse>, AppError> {
    let t_total = Instant::now();
    tracing::info!(body_bytes = body.len(), "received request to /predict");

    let req = PredictRequest::from_body(&body).inspect_err(|e| {
        tracing::info!("请求解析失败: {}", e);
    })?;
    drop(body);

    let permit = state
        .analysis_semaphore
        .clone()
        .acquire_owned()
        .await
        .map_err(|e| AppError::Processing(format!("获取分析信号量失败: {e}")))?;

    let (permit, image) = decode_off_runtime(permit, req.image).await?;
    let (height, width, channels) = image.shape();
    tracing::debug!(height, width, channels, "图片解码完成");

    // 许可一直持有到分析器返回
    let score = state
        .analyzer
        .detect_face(&image)
        .await
        .and_then(ensure_finite)
        .inspect_err(|e| tracing::warn!("分析器执行失败: {}", e))?;
    drop(image);
    drop(permit);

    tracing::info!(
        concentration_index = score,
        elapsed_ms = t_total.elapsed().as_millis() as u64,
        "analysis complete"
    );
    Ok(Json(PredictResponse {
        concentration_index: score,
    }))
}

/// 图片解码属于 CPU 密集型同步任务，移出 tokio worker。
///
/// 许可随任务进入阻塞线程，请求被取消时也要等解码结束才释放。
async fn decode_off_runtime(
    permit: OwnedSemaphorePermit,
    raw: String,
) -> Result<(OwnedSemaphorePermit, PixelArray), AppError> {
    let (permit, decoded) = tokio::task::spawn_blocking(move || {
        let decoded = decoder::decode_base64_image(&raw);
        (permit, decoded)
    })
    .await?;

    let image = decoded.map_err(|e| {
        tracing::info!("图片解码失败: {} ({})", e, e.detail());
        AppError::from(e)
    })?;
    Ok((permit, image))
}

fn ensure_finite(score: f64) -> Result<f64, AnalyzerError> {
    if score.is_finite() {
        Ok(score)
    } else {
        Err(AnalyzerError::InvalidScore(score.to_string()))
    }
}

pub fn create_predict_router() -> Router<AppState> {
    Router::new().route("/predict", get(predict).post(predict))
}
