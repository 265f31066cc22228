use concentration_service::features::analysis::build_analyzer;
use concentration_service::startup::run_startup_checks;
use concentration_service::{AppConfig, AppState, ShutdownManager, build_app};

fn init_tracing(config: &AppConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.default_log_filter().into());
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if config.logging.format == "compact" {
        builder.compact().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() {
    // Load config
    let config = match AppConfig::load() {
        Ok(c) => c,
        Err(e) => {
            init_tracing(&AppConfig::default());
            tracing::error!("Config init failed: {}", e);
            std::process::exit(1);
        }
    };
    init_tracing(&config);
    tracing::info!("配置文件: {:?}", AppConfig::config_path());
    tracing::debug!(
        "配置加载完成: analyzer = {}, debug = {}",
        config.analyzer.kind.as_str(),
        config.server.debug
    );

    let shutdown_manager = ShutdownManager::new();
    if let Err(e) = shutdown_manager.start_signal_handler() {
        tracing::error!("信号处理器启动失败: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = run_startup_checks(&config).await {
        tracing::error!("Startup checks failed: {}", e);
        std::process::exit(1);
    }

    // 分析器在进程内只构建一次，注入到共享状态
    let analyzer = build_analyzer(&config.analyzer).unwrap_or_else(|e| {
        tracing::error!("Analyzer init failed: {}", e);
        std::process::exit(1);
    });
    let app_state = AppState::new(analyzer, config.image.effective_parallelism());
    let app = build_app(app_state, &config);

    let addr = config.server_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Bind address failed {}: {}", addr, e);
            std::process::exit(1);
        });

    tracing::info!("Server: http://{}", addr);
    tracing::info!("Predict: http://{}/predict", addr);
    tracing::info!("Docs: http://{}/docs", addr);
    if config.server.debug {
        tracing::warn!("调试模式已开启，日志将包含请求诊断信息");
    }

    let shutdown_config = config.shutdown.clone();
    let manager = shutdown_manager.clone();
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let reason = manager.wait_for_shutdown().await;
                tracing::info!("接收到退出信号: {:?}，开始优雅关闭HTTP服务器...", reason);
            })
            .await
    });

    tokio::select! {
        res = &mut server => {
            report_server_exit(res);
            return;
        }
        _ = shutdown_manager.wait_for_shutdown() => {}
    }

    // 退出信号到达后才开始计时：超时仍未排空连接则按配置强制退出
    tracing::info!("优雅退出超时时间: {}秒", shutdown_config.timeout_secs);
    match tokio::time::timeout(shutdown_config.timeout_duration(), &mut server).await {
        Ok(res) => report_server_exit(res),
        Err(_) => {
            tracing::warn!("优雅退出超时");
            if shutdown_config.force_quit {
                tracing::info!("等待 {} 秒后强制退出", shutdown_config.force_delay_secs);
                tokio::time::sleep(shutdown_config.force_delay_duration()).await;
                std::process::exit(1);
            }
            report_server_exit(server.await);
        }
    }
}

fn report_server_exit(res: Result<std::io::Result<()>, tokio::task::JoinError>) {
    match res {
        Ok(Ok(())) => tracing::info!("服务器已优雅关闭"),
        Ok(Err(e)) => {
            tracing::error!("服务器运行错误: {}", e);
            std::process::exit(1);
        }
        Err(e) => {
            tracing::error!("服务器任务异常退出: {}", e);
            std::process::exit(1);
        }
    }
}
