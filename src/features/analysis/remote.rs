use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD as base64_engine};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{Analyzer, AnalyzerError};
use crate::features::predict::PixelArray;

/// 远程分析器：把 BGR 像素数组转发给外部视觉服务
///
/// 请求：`{ width, height, channels, layout: "bgr", data: <base64 像素> }`
/// 响应：`{ "concentration_index": f64 }`，失败时可返回 `{ "error": "..." }`
#[derive(Debug, Clone)]
pub struct RemoteAnalyzer {
    /// `Client` 内部自带连接池，线程安全，可在请求间复用
    client: Client,
    endpoint: Url,
}

#[derive(Serialize)]
struct AnalyzeRequest<'a> {
    width: u32,
    height: u32,
    channels: usize,
    layout: &'a str,
    data: String,
}

#[derive(Deserialize)]
struct AnalyzeReply {
    #[serde(default)]
    concentration_index: Option<f64>,
    #[serde(default)]
    error: Option<String>,
}

impl RemoteAnalyzer {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, AnalyzerError> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| AnalyzerError::Config(format!("endpoint {endpoint:?}: {e}")))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(AnalyzerError::Config(format!(
                "endpoint must be http(s), got {}",
                endpoint.scheme()
            )));
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AnalyzerError::Config(format!("build http client: {e}")))?;
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl Analyzer for RemoteAnalyzer {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn detect_face(&self, image: &PixelArray) -> Result<f64, AnalyzerError> {
        let payload = AnalyzeRequest {
            width: image.width(),
            height: image.height(),
            channels: image.channels(),
            layout: "bgr",
            data: base64_engine.encode(image.as_bytes()),
        };

        let resp = self
            .client
            .post(self.endpoint.clone())
            .json(&payload)
            .send()
            .await?;
        let status = resp.status();
        let body = resp.bytes().await?;
        let reply: Option<AnalyzeReply> = serde_json::from_slice(&body).ok();

        if !status.is_success() {
            let msg = reply
                .and_then(|r| r.error)
                .unwrap_or_else(|| format!("analyzer responded with HTTP {status}"));
            return Err(AnalyzerError::Upstream(msg));
        }

        match reply {
            Some(AnalyzeReply {
                concentration_index: Some(score),
                ..
            }) => Ok(score),
            Some(AnalyzeReply {
                error: Some(msg), ..
            }) => Err(AnalyzerError::Upstream(msg)),
            _ => Err(AnalyzerError::InvalidResponse(
                "missing concentration_index".into(),
            )),
        }
    }
}
