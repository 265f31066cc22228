use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AppError;

/// 分析请求
///
/// 只识别 `image` 字段，其余字段忽略。
#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[schema(example = json!({ "image": "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAIAAACQd1PeAAAADElEQVR4nGP4z8AAAAMBAQDJ/pLvAAAAAElFTkSuQmCC" }))]
pub struct PredictRequest {
    /// base64 编码的图片（JPEG/PNG 等），可带 `data:image/...;base64,` 前缀
    pub image: String,
}

impl PredictRequest {
    /// 从原始请求体解析（不要求 Content-Type 为 JSON）。
    pub fn from_body(body: &[u8]) -> Result<Self, AppError> {
        let value: Value = serde_json::from_slice(body).map_err(|e| {
            tracing::debug!("请求体 JSON 解析失败: {}", e);
            AppError::BadRequest("malformed request body".into())
        })?;

        let Value::Object(mut map) = value else {
            tracing::debug!("请求体不是 JSON 对象");
            return Err(AppError::BadRequest("malformed request body".into()));
        };

        tracing::debug!(keys = ?map.keys().collect::<Vec<_>>(), "request data keys");

        match map.remove("image") {
            Some(Value::String(image)) if !image.trim().is_empty() => Ok(Self { image }),
            _ => Err(AppError::BadRequest("no image data provided".into())),
        }
    }
}

/// 分析结果
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[schema(example = json!({ "concentration_index": 0.82 }))]
pub struct PredictResponse {
    /// 专注度指数
    pub concentration_index: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bad_request_message(body: &[u8]) -> String {
        match PredictRequest::from_body(body) {
            Err(AppError::BadRequest(msg)) => msg,
            other => panic!("expected BadRequest, got {other:?}"),
        }
    }

    #[test]
    fn parses_image_and_ignores_other_fields() {
        let req = PredictRequest::from_body(br#"{"image":"abcd","frame":3}"#).expect("parse");
        assert_eq!(req.image, "abcd");
    }

    #[test]
    fn malformed_json_is_bad_request() {
        assert_eq!(bad_request_message(b"{not json"), "malformed request body");
        assert_eq!(bad_request_message(b""), "malformed request body");
        assert_eq!(bad_request_message(b"[1,2,3]"), "malformed request body");
    }

    #[test]
    fn missing_or_empty_image_is_bad_request() {
        assert_eq!(bad_request_message(b"{}"), "no image data provided");
        assert_eq!(bad_request_message(br#"{"image":""}"#), "no image data provided");
        assert_eq!(bad_request_message(br#"{"image":"  "}"#), "no image data provided");
        assert_eq!(bad_request_message(br#"{"image":null}"#), "no image data provided");
        assert_eq!(bad_request_message(br#"{"image":42}"#), "no image data provided");
    }

    #[test]
    fn response_serializes_single_field() {
        let v = serde_json::to_value(PredictResponse {
            concentration_index: 0.5,
        })
        .expect("serialize");
        assert_eq!(v, serde_json::json!({ "concentration_index": 0.5 }));
    }
}
