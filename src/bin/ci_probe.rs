//! 本地联调工具：读取图片文件，base64 编码后提交到 `/predict` 并打印结果。

use std::env;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

use base64::{Engine as _, engine::general_purpose::STANDARD as base64_engine};
use reqwest::Client;
use serde::{Deserialize, Serialize};

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
struct Args {
    help: bool,
    json: bool,
    base_url: Option<String>,
    timeout_secs: u64,
    files: Vec<PathBuf>,
}

#[derive(Debug, Serialize)]
struct PredictRequest {
    image: String,
}

#[derive(Debug, Deserialize, Serialize)]
struct PredictReply {
    #[serde(default)]
    concentration_index: Option<f64>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug)]
enum CliError {
    Args(String),
    Io(String),
    Network(String),
    Api { status: u16, detail: String },
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Args(msg) => write!(f, "参数错误: {msg}"),
            CliError::Io(msg) => write!(f, "读取文件失败: {msg}"),
            CliError::Network(msg) => write!(f, "网络错误: {msg}"),
            CliError::Api { status, detail } => write!(f, "接口错误: status={status} {detail}"),
        }
    }
}

impl std::error::Error for CliError {}

impl Args {
    fn parse(argv: Vec<String>) -> Result<Self, CliError> {
        let mut help = false;
        let mut json = false;
        let mut base_url = None;
        let mut timeout_secs = DEFAULT_TIMEOUT_SECS;
        let mut files = Vec::new();
        let mut idx = 0usize;

        while idx < argv.len() {
            match argv[idx].as_str() {
                "-h" | "--help" => help = true,
                "--json" => json = true,
                "--base-url" => {
                    idx += 1;
                    base_url = Some(
                        argv.get(idx)
                            .ok_or_else(|| CliError::Args("缺少 --base-url 的值".to_string()))?
                            .to_string(),
                    );
                }
                "--timeout-secs" => {
                    idx += 1;
                    let raw = argv
                        .get(idx)
                        .ok_or_else(|| CliError::Args("缺少 --timeout-secs 的值".to_string()))?;
                    timeout_secs = raw.parse().map_err(|_| {
                        CliError::Args(format!("--timeout-secs 需要正整数，收到 {raw}"))
                    })?;
                }
                other if other.starts_with("--") => {
                    return Err(CliError::Args(format!("未知参数 {other}")));
                }
                path => files.push(PathBuf::from(path)),
            }
            idx += 1;
        }

        Ok(Self {
            help,
            json,
            base_url,
            timeout_secs,
            files,
        })
    }
}

fn print_help() {
    println!(
        r#"ci_probe（专注度服务联调工具）

用法：
  ci_probe [参数] <图片文件>...

参数：
  --base-url URL            服务地址（默认从 config 解析，否则 http://127.0.0.1:5000）
  --timeout-secs N          请求超时秒数（默认 30）
  --json                    JSON 输出（便于脚本集成）
  -h, --help                显示帮助"#
    );
}

fn default_base_url() -> String {
    match concentration_service::AppConfig::load() {
        Ok(cfg) => {
            let host = if cfg.server.host == "0.0.0.0" {
                "127.0.0.1".to_string()
            } else {
                cfg.server.host.clone()
            };
            format!("http://{}:{}", host, cfg.server.port)
        }
        Err(_) => DEFAULT_BASE_URL.to_string(),
    }
}

async fn probe(client: &Client, base_url: &str, path: &Path) -> Result<PredictReply, CliError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| CliError::Io(format!("{}: {e}", path.display())))?;
    let body = PredictRequest {
        image: base64_engine.encode(bytes),
    };

    let resp = client
        .post(format!("{base_url}/predict"))
        .json(&body)
        .send()
        .await
        .map_err(|e| CliError::Network(e.to_string()))?;
    let status = resp.status();
    let body = resp
        .bytes()
        .await
        .map_err(|e| CliError::Network(e.to_string()))?;
    interpret_reply(status.as_u16(), &body)
}

/// 先看状态码再解析响应体；非 JSON 的错误响应（如 413）保留原始文本
fn interpret_reply(status: u16, body: &[u8]) -> Result<PredictReply, CliError> {
    let parsed = serde_json::from_slice::<PredictReply>(body);

    if !(200..300).contains(&status) {
        let detail = match parsed {
            Ok(PredictReply {
                error: Some(msg), ..
            }) => msg,
            _ => String::from_utf8_lossy(body).trim().to_string(),
        };
        return Err(CliError::Api { status, detail });
    }

    parsed.map_err(|e| CliError::Network(format!("响应解析失败: {e}")))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let args = Args::parse(env::args().skip(1).collect())?;
    if args.help || args.files.is_empty() {
        print_help();
        return Ok(());
    }

    let base_url = args
        .base_url
        .unwrap_or_else(default_base_url)
        .trim_end_matches('/')
        .to_string();
    let client = Client::builder()
        .timeout(Duration::from_secs(args.timeout_secs.max(1)))
        .build()
        .map_err(|e| CliError::Network(e.to_string()))?;

    let mut failed = 0usize;
    for path in &args.files {
        match probe(&client, &base_url, path).await {
            Ok(reply) if args.json => println!("{}", serde_json::to_string(&reply)?),
            Ok(reply) => println!(
                "{}\tconcentration_index={}",
                path.display(),
                reply
                    .concentration_index
                    .map(|v| format!("{v:.4}"))
                    .unwrap_or_else(|| "-".to_string())
            ),
            Err(e) => {
                failed += 1;
                eprintln!("{}\t{e}", path.display());
            }
        }
    }

    if failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_flags_and_files() {
        let args = Args::parse(argv(&[
            "--base-url",
            "http://host:1",
            "--json",
            "a.png",
            "b.jpg",
        ]))
        .expect("parse");
        assert!(args.json);
        assert_eq!(args.base_url.as_deref(), Some("http://host:1"));
        assert_eq!(args.files.len(), 2);
        assert_eq!(args.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn plain_text_error_keeps_status_and_body() {
        let err = interpret_reply(413, b"length limit exceeded").expect_err("should fail");
        match err {
            CliError::Api { status, detail } => {
                assert_eq!(status, 413);
                assert_eq!(detail, "length limit exceeded");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn json_error_uses_error_field() {
        let err = interpret_reply(400, br#"{"error":"no image data provided"}"#)
            .expect_err("should fail");
        assert!(matches!(
            err,
            CliError::Api { status: 400, ref detail } if detail == "no image data provided"
        ));
    }

    #[test]
    fn success_reply_is_parsed() {
        let reply = interpret_reply(200, br#"{"concentration_index":0.5}"#).expect("parse");
        assert_eq!(reply.concentration_index, Some(0.5));

        let err = interpret_reply(200, b"oops").expect_err("garbage body");
        assert!(matches!(err, CliError::Network(_)));
    }

    #[test]
    fn rejects_unknown_flag_and_missing_value() {
        assert!(Args::parse(argv(&["--nope"])).is_err());
        assert!(Args::parse(argv(&["--timeout-secs"])).is_err());
        assert!(Args::parse(argv(&["--timeout-secs", "abc"])).is_err());
    }
}
