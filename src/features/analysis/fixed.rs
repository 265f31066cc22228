use async_trait::async_trait;

use super::{Analyzer, AnalyzerError};
use crate::features::predict::PixelArray;

/// 固定分数分析器：不看图片内容，始终返回配置的分数。
///
/// 用于未部署视觉后端时的本地联调与冒烟测试。
#[derive(Debug, Clone, Copy)]
pub struct FixedAnalyzer {
    score: f64,
}

impl FixedAnalyzer {
    pub fn new(score: f64) -> Result<Self, AnalyzerError> {
        if !score.is_finite() {
            return Err(AnalyzerError::Config(format!(
                "fixed_score must be finite, got {score}"
            )));
        }
        Ok(Self { score })
    }
}

#[async_trait]
impl Analyzer for FixedAnalyzer {
    fn name(&self) -> &'static str {
        "fixed"
    }

    async fn detect_face(&self, image: &PixelArray) -> Result<f64, AnalyzerError> {
        tracing::trace!(width = image.width(), height = image.height(), "fixed analyzer");
        Ok(self.score)
    }
}
