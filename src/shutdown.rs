//! 优雅退出管理模块
//!
//! 监听 SIGINT/SIGTERM（Windows 下为 Ctrl+C），并把退出信号交给 `axum::serve` 的 graceful shutdown。

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Notify;
use tracing::{debug, info};

/// 退出原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// 用户中断信号 (Ctrl+C)
    Interrupt,
    /// 终止信号 (SIGTERM)
    Terminate,
    /// 应用请求退出
    Application,
}

/// 优雅退出错误类型
#[derive(Debug, thiserror::Error)]
pub enum ShutdownError {
    #[error("信号设置失败: {0}")]
    SignalSetup(String),
}

#[derive(Debug)]
struct ShutdownInner {
    notify: Notify,
    /// 第一次触发时记录的原因
    reason: Mutex<Option<ShutdownReason>>,
    triggered: AtomicBool,
}

/// 优雅退出管理器（可廉价克隆，克隆间共享状态）
#[derive(Debug, Clone)]
pub struct ShutdownManager {
    inner: Arc<ShutdownInner>,
}

impl ShutdownManager {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ShutdownInner {
                notify: Notify::new(),
                reason: Mutex::new(None),
                triggered: AtomicBool::new(false),
            }),
        }
    }

    /// 触发退出；只有第一次触发生效
    pub fn trigger_shutdown(&self, reason: ShutdownReason) {
        if self
            .inner
            .triggered
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("重复的退出信号被忽略: {:?}", reason);
            return;
        }

        info!("触发优雅退出: {:?}", reason);
        if let Ok(mut guard) = self.inner.reason.lock() {
            *guard = Some(reason);
        }
        self.inner.notify.notify_waiters();
    }

    pub fn is_shutting_down(&self) -> bool {
        self.inner.triggered.load(Ordering::SeqCst)
    }

    fn recorded_reason(&self) -> ShutdownReason {
        self.inner
            .reason
            .lock()
            .ok()
            .and_then(|g| *g)
            .unwrap_or(ShutdownReason::Application)
    }

    /// 等待退出信号，返回退出原因
    pub async fn wait_for_shutdown(&self) -> ShutdownReason {
        // 先注册再检查，避免触发发生在两步之间时丢失通知
        let notified = self.inner.notify.notified();
        if self.is_shutting_down() {
            return self.recorded_reason();
        }
        notified.await;
        self.recorded_reason()
    }

    /// 启动信号监听任务
    pub fn start_signal_handler(&self) -> Result<(), ShutdownError> {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{SignalKind, signal};

            let mut sigint = signal(SignalKind::interrupt())
                .map_err(|e| ShutdownError::SignalSetup(e.to_string()))?;
            let mut sigterm = signal(SignalKind::terminate())
                .map_err(|e| ShutdownError::SignalSetup(e.to_string()))?;

            let manager = self.clone();
            tokio::spawn(async move {
                tokio::select! {
                    _ = sigint.recv() => manager.trigger_shutdown(ShutdownReason::Interrupt),
                    _ = sigterm.recv() => manager.trigger_shutdown(ShutdownReason::Terminate),
                }
            });
        }

        #[cfg(not(unix))]
        {
            let manager = self.clone();
            tokio::spawn(async move {
                match tokio::signal::ctrl_c().await {
                    Ok(()) => manager.trigger_shutdown(ShutdownReason::Interrupt),
                    Err(e) => tracing::error!("监听Ctrl+C信号失败: {}", e),
                }
            });
        }

        info!("信号处理器已启动");
        Ok(())
    }
}

impl Default for ShutdownManager {
    fn default() -> Self {
        Self::new()
    }
}
