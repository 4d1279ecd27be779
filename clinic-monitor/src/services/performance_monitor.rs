//! 性能监控服务
//!
//! 职责: 统计页面加载、API调用、错误次数,保留最近的响应耗时样本
//! 策略: 每次变更后把完整快照写回 `performance_metrics`
//!
//! 两个埋点:
//! - panic钩子: 未处理的panic计入错误 (经由通道交给后台任务处理)
//! - `ApiClient` 拦截器槽位: 每次出站调用计时

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::models::{LogLevel, MetricsSnapshot, MonitorConfig, MonitorError, ResponseSample};
use crate::services::api_client::{ApiClient, CallInterceptor};
use crate::services::event_log::EventLog;
use crate::services::kv_store::{self, keys, KeyValueStore};

const MODULE: &str = "PerformanceMonitor";

/// 错误类型: 未处理的panic
pub const ERROR_UNHANDLED: &str = "UNHANDLED";
/// 错误类型: 出站调用失败
pub const ERROR_API_CALL: &str = "API_CALL";

/// 进程内同一时刻只允许一个panic捕获,卸载时才能原样恢复钩子
static PANIC_CAPTURE_ACTIVE: AtomicBool = AtomicBool::new(false);

/// panic钩子捕获的信息
#[derive(Debug)]
struct PanicReport {
    message: String,
    file: Option<String>,
    line: Option<u32>,
    column: Option<u32>,
}

/// 已安装的埋点
struct InstalledHooks {
    /// 关闭panic捕获时为 `None`
    panic_capture: Option<PanicCapture>,
}

/// 已安装的panic捕获
struct PanicCapture {
    cancel: CancellationToken,
    drain_task: JoinHandle<()>,
    /// 恢复安装前的钩子
    restore_hook: Box<dyn FnOnce() + Send>,
}

/// 性能监控器
///
/// 内存快照是当前进程的权威数据;持久化失败记为 ERROR 日志后忽略。
pub struct PerformanceMonitor {
    store: Arc<dyn KeyValueStore>,
    event_log: Arc<EventLog>,
    capture_panics: bool,
    metrics: Mutex<MetricsSnapshot>,
    /// 持久化快照只在首次初始化时加载
    loaded: AtomicBool,
    hooks: Mutex<Option<InstalledHooks>>,
}

impl PerformanceMonitor {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        event_log: Arc<EventLog>,
        config: &MonitorConfig,
    ) -> Self {
        Self {
            store,
            event_log,
            capture_panics: config.capture_panics,
            metrics: Mutex::new(MetricsSnapshot::default()),
            loaded: AtomicBool::new(false),
            hooks: Mutex::new(None),
        }
    }

    /// 初始化监控
    ///
    /// 每次调用都计一次页面加载;埋点只安装一次,重复调用不会重复统计。
    ///
    /// 失败时不改变任何状态。
    ///
    /// # 错误
    /// - `MonitorError::RuntimeUnavailable`: 启用了panic捕获但不在tokio运行时内
    /// - `MonitorError::PanicCaptureActive`: 另一个监控器的panic捕获尚未卸载
    pub async fn initialize(self: &Arc<Self>, client: &ApiClient) -> Result<(), MonitorError> {
        let mut hooks = self.hooks.lock().await;
        let claim_capture = hooks.is_none() && self.capture_panics;
        if claim_capture {
            if tokio::runtime::Handle::try_current().is_err() {
                return Err(MonitorError::RuntimeUnavailable);
            }
            if PANIC_CAPTURE_ACTIVE
                .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
                .is_err()
            {
                return Err(MonitorError::PanicCaptureActive);
            }
        }

        if !self.loaded.swap(true, Ordering::SeqCst) {
            self.load_persisted().await;
        }

        self.track_page_load().await;

        if hooks.is_none() {
            let panic_capture = claim_capture.then(|| self.install_panic_capture());
            *hooks = Some(InstalledHooks { panic_capture });
        }
        drop(hooks);

        client
            .set_interceptor(Arc::clone(self) as Arc<dyn CallInterceptor>)
            .await;

        self.event_log
            .info(MODULE, "Performance monitoring initialized", None)
            .await?;
        Ok(())
    }

    /// 卸载埋点
    ///
    /// 移除客户端拦截器,恢复安装前的panic钩子,停止后台任务。
    /// 进程内同时只有一个监控器能安装panic捕获,因此恢复的就是安装前的钩子;
    /// 但若安装之后有监控器以外的代码替换过panic钩子,恢复会覆盖它。
    pub async fn teardown(&self, client: &ApiClient) {
        client.clear_interceptor().await;

        let installed = self.hooks.lock().await.take();
        if let Some(capture) = installed.and_then(|hooks| hooks.panic_capture) {
            (capture.restore_hook)();
            PANIC_CAPTURE_ACTIVE.store(false, Ordering::SeqCst);
            capture.cancel.cancel();
            if let Err(e) = capture.drain_task.await {
                tracing::warn!(error = %e, "Panic drain task ended abnormally");
            }
        }

        tracing::info!("Performance monitoring torn down");
    }

    /// 埋点是否已安装
    pub async fn is_initialized(&self) -> bool {
        self.hooks.lock().await.is_some()
    }

    /// 记录一次API调用
    pub async fn track_api_call(&self, url: &str, duration_ms: f64, status: u16) {
        let timestamp = Utc::now();
        {
            let mut metrics = self.metrics.lock().await;
            metrics.api_calls += 1;
            metrics.push_sample(ResponseSample {
                url: url.to_string(),
                duration: duration_ms,
                timestamp,
            });
            self.persist(&metrics).await;
        }

        self.log(
            LogLevel::Debug,
            &format!("API call to {}", url),
            json!({
                "duration": duration_ms,
                "status": status,
                "timestamp": timestamp.to_rfc3339(),
            }),
        )
        .await;
    }

    /// 记录一次错误
    ///
    /// # 参数
    /// - `kind`: 错误类型,如 `UNHANDLED`、`API_CALL`
    /// - `message`: 错误描述,为空时记为 `unknown error`
    /// - `details`: 附加信息,缺省为空对象
    pub async fn track_error(&self, kind: &str, message: &str, details: Option<Value>) {
        {
            let mut metrics = self.metrics.lock().await;
            metrics.errors += 1;
            self.persist(&metrics).await;
        }

        let message = if message.trim().is_empty() {
            "unknown error"
        } else {
            message
        };
        self.log(
            LogLevel::Error,
            message,
            json!({
                "type": kind,
                "details": details.unwrap_or_else(|| json!({})),
                "timestamp": Utc::now().to_rfc3339(),
            }),
        )
        .await;
    }

    /// 当前指标快照 (副本)
    pub async fn get_metrics(&self) -> MetricsSnapshot {
        self.metrics.lock().await.clone()
    }

    /// 清零所有指标并删除持久化键
    pub async fn clear_metrics(&self) {
        let mut metrics = self.metrics.lock().await;
        *metrics = MetricsSnapshot::default();
        self.persist(&metrics).await;

        if let Err(e) = self.store.remove(keys::PERFORMANCE_METRICS).await {
            self.log(
                LogLevel::Error,
                "Failed to remove persisted metrics",
                json!({ "error": e.to_string() }),
            )
            .await;
        }
        tracing::info!("Performance metrics cleared");
    }

    async fn track_page_load(&self) {
        let mut metrics = self.metrics.lock().await;
        metrics.page_loads += 1;
        self.persist(&metrics).await;
    }

    async fn load_persisted(&self) {
        match kv_store::load_json::<MetricsSnapshot>(&*self.store, keys::PERFORMANCE_METRICS).await
        {
            Ok(Some(snapshot)) => {
                tracing::debug!(
                    page_loads = snapshot.page_loads,
                    api_calls = snapshot.api_calls,
                    errors = snapshot.errors,
                    "Loaded persisted metrics"
                );
                *self.metrics.lock().await = snapshot;
            }
            Ok(None) => {}
            Err(e) => {
                self.log(
                    LogLevel::Warn,
                    "Persisted metrics unreadable, starting from zero",
                    json!({ "error": e.to_string() }),
                )
                .await;
            }
        }
    }

    async fn persist(&self, snapshot: &MetricsSnapshot) {
        if let Err(e) =
            kv_store::save_json(&*self.store, keys::PERFORMANCE_METRICS, snapshot).await
        {
            self.log(
                LogLevel::Error,
                "Failed to persist metrics",
                json!({ "error": e.to_string() }),
            )
            .await;
        }
    }

    /// 监控内部日志,消息均非空,写入失败只交给 tracing
    async fn log(&self, level: LogLevel, message: &str, data: Value) {
        if let Err(e) = self.event_log.record(level, MODULE, message, Some(data)).await {
            tracing::warn!(error = %e, "Monitor failed to record log entry");
        }
    }

    /// 调用方须已确认处于tokio运行时内
    fn install_panic_capture(self: &Arc<Self>) -> PanicCapture {
        let (tx, rx) = mpsc::unbounded_channel::<PanicReport>();
        let previous = Arc::new(std::panic::take_hook());

        let chained = Arc::clone(&previous);
        std::panic::set_hook(Box::new(move |info| {
            let payload = info.payload();
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_default();
            let location = info.location();
            let _ = tx.send(PanicReport {
                message,
                file: location.map(|l| l.file().to_string()),
                line: location.map(|l| l.line()),
                column: location.map(|l| l.column()),
            });
            (*chained)(info);
        }));

        let restore_hook = Box::new(move || {
            let _ = std::panic::take_hook();
            std::panic::set_hook(Box::new(move |info| (*previous)(info)));
        });

        let cancel = CancellationToken::new();
        let drain_task = tokio::spawn(drain_panic_reports(
            Arc::downgrade(self),
            rx,
            cancel.clone(),
        ));

        tracing::debug!("Panic capture installed");
        PanicCapture {
            cancel,
            drain_task,
            restore_hook,
        }
    }
}

/// 把panic报告转成错误指标,直到取消或监控器被释放
async fn drain_panic_reports(
    monitor: Weak<PerformanceMonitor>,
    mut rx: mpsc::UnboundedReceiver<PanicReport>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            report = rx.recv() => {
                let Some(report) = report else { break };
                let Some(monitor) = monitor.upgrade() else { break };
                monitor
                    .track_error(
                        ERROR_UNHANDLED,
                        &report.message,
                        Some(json!({
                            "filename": report.file,
                            "lineno": report.line,
                            "colno": report.column,
                        })),
                    )
                    .await;
            }
        }
    }
}

#[async_trait]
impl CallInterceptor for PerformanceMonitor {
    async fn on_completed(&self, url: &str, duration_ms: f64, status: u16) {
        self.track_api_call(url, duration_ms, status).await;
    }

    async fn on_failed(&self, url: &str, message: &str) {
        self.track_error(ERROR_API_CALL, message, Some(json!({ "url": url })))
            .await;
    }
}
