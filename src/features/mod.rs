/// 专注度分析器（外部能力的抽象与实现）
pub mod analysis;

/// 存活与健康检查
pub mod health;

/// `/predict`：请求解析、图片解码与分析
pub mod predict;
