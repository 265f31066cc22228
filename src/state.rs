use std::sync::Arc;
use tokio::sync::Semaphore;

use crate::features::analysis::Analyzer;

/// 聚合的应用共享状态
#[derive(Clone)]
pub struct AppState {
    /// 启动时构建的分析器，请求间共享
    pub analyzer: Arc<dyn Analyzer>,
    /// 限制同时进行的 解码 + 分析 数量（解码与分析器序列化均为 CPU 密集型）
    pub analysis_semaphore: Arc<Semaphore>,
}

impl AppState {
    pub fn new(analyzer: Arc<dyn Analyzer>, max_parallel: usize) -> Self {
        Self {
            analyzer,
            analysis_semaphore: Arc::new(Semaphore::new(max_parallel.max(1))),
        }
    }
}
