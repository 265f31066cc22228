use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 配置文件路径的环境变量覆盖
const CONFIG_PATH_ENV: &str = "APP_CONFIG_PATH";

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "ServerConfig::default_host")]
    pub host: String,
    /// 监听端口
    #[serde(default = "ServerConfig::default_port")]
    pub port: u16,
    /// 调试模式：提升默认日志级别，输出更详细的请求诊断信息
    #[serde(default)]
    pub debug: bool,
}

impl ServerConfig {
    fn default_host() -> String {
        "0.0.0.0".to_string()
    }
    fn default_port() -> u16 {
        5000
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
            debug: false,
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,
    /// 日志格式：full | compact
    #[serde(default = "LoggingConfig::default_format")]
    pub format: String,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_string()
    }
    fn default_format() -> String {
        "full".to_string()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            format: Self::default_format(),
        }
    }
}

/// CORS 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// 是否启用 CORS
    #[serde(default = "CorsConfig::default_enabled")]
    pub enabled: bool,
    /// 允许的 Origin 列表（支持 "*" 表示任意）
    #[serde(default = "CorsConfig::default_origins")]
    pub allowed_origins: Vec<String>,
    /// 允许的方法列表（支持 "*" 表示任意）
    #[serde(default = "CorsConfig::default_methods")]
    pub allowed_methods: Vec<String>,
    /// 允许的请求头列表（支持 "*" 表示任意）
    #[serde(default = "CorsConfig::default_headers")]
    pub allowed_headers: Vec<String>,
    /// 暴露的响应头列表（支持 "*" 表示任意）
    #[serde(default)]
    pub expose_headers: Vec<String>,
    /// 是否允许携带凭证（Cookie/Authorization）
    #[serde(default)]
    pub allow_credentials: bool,
    /// 预检缓存时间（秒）
    #[serde(default)]
    pub max_age_secs: Option<u64>,
}

impl CorsConfig {
    fn default_enabled() -> bool {
        true
    }

    fn default_origins() -> Vec<String> {
        vec!["*".to_string()]
    }

    fn default_methods() -> Vec<String> {
        vec!["GET".to_string(), "POST".to_string(), "OPTIONS".to_string()]
    }

    fn default_headers() -> Vec<String> {
        vec!["Content-Type".to_string()]
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: Self::default_enabled(),
            allowed_origins: Self::default_origins(),
            allowed_methods: Self::default_methods(),
            allowed_headers: Self::default_headers(),
            expose_headers: Vec::new(),
            allow_credentials: false,
            max_age_secs: None,
        }
    }
}

/// 图片解码配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    /// 同时进行的 解码 + 分析 许可数（0=自动，取 CPU 核心数）
    #[serde(default)]
    pub max_parallel: u32,
    /// 请求体大小上限（字节），base64 文本约为原图的 4/3
    #[serde(default = "ImageConfig::default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl ImageConfig {
    fn default_max_body_bytes() -> usize {
        16 * 1024 * 1024
    }

    /// 实际生效的并发许可数
    pub fn effective_parallelism(&self) -> usize {
        match self.max_parallel as usize {
            0 => num_cpus::get().max(1),
            n => n,
        }
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            max_parallel: 0,
            max_body_bytes: Self::default_max_body_bytes(),
        }
    }
}

/// 分析器类型
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AnalyzerKind {
    /// 通过 HTTP 调用外部分析服务
    #[default]
    Remote,
    /// 固定分数（本地开发/冒烟测试）
    Fixed,
}

impl AnalyzerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalyzerKind::Remote => "remote",
            AnalyzerKind::Fixed => "fixed",
        }
    }
}

/// 分析器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// 分析器类型
    #[serde(default)]
    pub kind: AnalyzerKind,
    /// 远程分析服务地址（kind = remote 时使用）
    #[serde(default = "AnalyzerConfig::default_endpoint")]
    pub endpoint: String,
    /// 远程调用超时（秒）
    #[serde(default = "AnalyzerConfig::default_timeout")]
    pub timeout_secs: u64,
    /// 固定分数（kind = fixed 时使用）
    #[serde(default)]
    pub fixed_score: f64,
}

impl AnalyzerConfig {
    fn default_endpoint() -> String {
        "http://127.0.0.1:5001/analyze".to_string()
    }
    fn default_timeout() -> u64 {
        10
    }

    pub fn timeout_duration(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_secs.max(1))
    }
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            kind: AnalyzerKind::default(),
            endpoint: Self::default_endpoint(),
            timeout_secs: Self::default_timeout(),
            fixed_score: 0.0,
        }
    }
}

/// 优雅退出配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShutdownConfig {
    /// 优雅退出超时时间（秒）
    #[serde(default = "ShutdownConfig::default_timeout")]
    pub timeout_secs: u64,
    /// 是否启用强制退出
    #[serde(default = "ShutdownConfig::default_force")]
    pub force_quit: bool,
    /// 强制退出前的等待时间（秒）
    #[serde(default = "ShutdownConfig::default_force_delay")]
    pub force_delay_secs: u64,
}

impl ShutdownConfig {
    fn default_timeout() -> u64 {
        30
    }
    fn default_force() -> bool {
        true
    }
    fn default_force_delay() -> u64 {
        10
    }

    /// 获取优雅退出超时时间
    pub fn timeout_duration(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_secs)
    }

    /// 获取强制退出等待时间
    pub fn force_delay_duration(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.force_delay_secs)
    }
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            timeout_secs: Self::default_timeout(),
            force_quit: Self::default_force(),
            force_delay_secs: Self::default_force_delay(),
        }
    }
}

/// 应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// CORS 配置
    #[serde(default)]
    pub cors: CorsConfig,
    /// 图片解码配置
    #[serde(default)]
    pub image: ImageConfig,
    /// 分析器配置
    #[serde(default)]
    pub analyzer: AnalyzerConfig,
    /// 优雅退出配置
    #[serde(default)]
    pub shutdown: ShutdownConfig,
}

impl AppConfig {
    /// 从配置文件加载配置（文件可缺省），支持环境变量覆盖
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Self::config_path())
    }

    /// 从指定路径加载配置；文件不存在时全部取默认值
    pub fn load_from(path: PathBuf) -> Result<Self, ConfigError> {
        let builder = ConfigBuilder::builder()
            .add_source(File::from(path).required(false))
            // 支持环境变量覆盖，例如：APP_SERVER__PORT=8080
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        builder.try_deserialize()
    }

    /// 配置文件路径：`APP_CONFIG_PATH`，缺省为 `config.toml`
    pub fn config_path() -> PathBuf {
        std::env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    /// 获取服务器监听地址
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// 默认日志过滤表达式（`RUST_LOG` 未设置时使用）
    pub fn default_log_filter(&self) -> String {
        let level = if self.server.debug {
            "debug"
        } else {
            self.logging.level.as_str()
        };
        format!("concentration_service={level},tower_http={level}")
    }
}
