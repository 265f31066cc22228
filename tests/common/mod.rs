#![allow(dead_code)]

use std::io::Cursor;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response},
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use concentration_service::{AppConfig, AppState, Analyzer, AnalyzerError, PixelArray, build_app};
use image::{ImageFormat, Rgb, RgbImage};

/// 返回蓝色通道均值 / 255，可据此确认响应与输入图片一一对应。
pub struct MeanBlueAnalyzer;

#[async_trait]
impl Analyzer for MeanBlueAnalyzer {
    fn name(&self) -> &'static str {
        "mean-blue"
    }

    async fn detect_face(&self, image: &PixelArray) -> Result<f64, AnalyzerError> {
        let bytes = image.as_bytes();
        let count = bytes.len() / image.channels();
        if count == 0 {
            return Err(AnalyzerError::Upstream("empty image".into()));
        }
        let sum: u64 = bytes
            .chunks_exact(image.channels())
            .map(|px| px[0] as u64)
            .sum();
        Ok(sum as f64 / count as f64 / 255.0)
    }
}

/// 总是失败的分析器
pub struct FailingAnalyzer(pub &'static str);

#[async_trait]
impl Analyzer for FailingAnalyzer {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn detect_face(&self, _image: &PixelArray) -> Result<f64, AnalyzerError> {
        Err(AnalyzerError::Upstream(self.0.to_string()))
    }
}

/// 返回 NaN 的分析器
pub struct NanAnalyzer;

#[async_trait]
impl Analyzer for NanAnalyzer {
    fn name(&self) -> &'static str {
        "nan"
    }

    async fn detect_face(&self, _image: &PixelArray) -> Result<f64, AnalyzerError> {
        Ok(f64::NAN)
    }
}

/// 记录同时处于分析中的请求数峰值
#[derive(Default)]
pub struct InFlightAnalyzer {
    current: AtomicUsize,
    pub peak: AtomicUsize,
}

#[async_trait]
impl Analyzer for InFlightAnalyzer {
    fn name(&self) -> &'static str {
        "in-flight"
    }

    async fn detect_face(&self, _image: &PixelArray) -> Result<f64, AnalyzerError> {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(30)).await;
        self.current.fetch_sub(1, Ordering::SeqCst);
        Ok(0.5)
    }
}

pub fn app_with_parallelism(analyzer: Arc<dyn Analyzer>, max_parallel: usize) -> Router {
    build_app(AppState::new(analyzer, max_parallel), &AppConfig::default())
}

pub fn app_with(analyzer: Arc<dyn Analyzer>) -> Router {
    app_with_config(analyzer, &AppConfig::default())
}

pub fn app_with_config(analyzer: Arc<dyn Analyzer>, config: &AppConfig) -> Router {
    build_app(AppState::new(analyzer, 4), config)
}

/// 纯色 PNG 的 base64 文本
pub fn solid_png_b64(width: u32, height: u32, rgb: [u8; 3]) -> String {
    let img = RgbImage::from_pixel(width, height, Rgb(rgb));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).expect("encode png");
    STANDARD.encode(out.into_inner())
}

pub fn json_request(method: &str, uri: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.into())
        .expect("build request")
}

pub async fn body_json(resp: Response<Body>) -> serde_json::Value {
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("parse json")
}
