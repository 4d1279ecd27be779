//! 事件日志服务
//!
//! 分级、有上限的系统事件记录:
//! - 低于阈值的日志直接忽略,不写存储也不输出
//! - 每次写入后把完整序列持久化到 `system_logs`
//! - 超过 1000 条时淘汰最旧的记录
//! - CRITICAL 日志额外触发告警通知

use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::models::{LogEntry, LogError, LogLevel, LogQuery, StorageError};
use crate::services::kv_store::{self, keys, KeyValueStore};

/// 持久化日志最多保留条数
pub const MAX_LOG_ENTRIES: usize = 1000;

const MODULE: &str = "EventLog";
/// 启动记录的来源模块
pub const STARTUP_MODULE: &str = "LoggingSystem";

/// 控制台输出通道
///
/// 每条被记录的日志都会输出一次;CRITICAL 日志额外调用告警通知。
pub trait ConsoleSink: Send + Sync {
    /// 输出一条已记录的日志
    fn emit(&self, entry: &LogEntry);

    /// CRITICAL 日志的告警通知 (真实告警集成的替身)
    fn notify_critical(&self, entry: &LogEntry);
}

/// 基于 tracing 的控制台输出
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl ConsoleSink for TracingSink {
    fn emit(&self, entry: &LogEntry) {
        let data = Value::Object(entry.data.clone());
        match entry.level {
            LogLevel::Debug => {
                tracing::debug!(module = %entry.module, data = %data, "{}", entry.console_line())
            }
            LogLevel::Info => {
                tracing::info!(module = %entry.module, data = %data, "{}", entry.console_line())
            }
            LogLevel::Warn => {
                tracing::warn!(module = %entry.module, data = %data, "{}", entry.console_line())
            }
            LogLevel::Error | LogLevel::Critical => {
                tracing::error!(module = %entry.module, data = %data, "{}", entry.console_line())
            }
        }
    }

    fn notify_critical(&self, entry: &LogEntry) {
        let data = Value::Object(entry.data.clone());
        tracing::error!(
            notification = "CRITICAL ERROR NOTIFICATION",
            module = %entry.module,
            timestamp = %entry.timestamp.to_rfc3339(),
            data = %data,
            "{}",
            entry.message
        );
    }
}

/// 事件日志存储
///
/// 内存序列是当前进程的权威数据;存储写入失败只记录到 tracing,不影响调用方。
pub struct EventLog {
    store: Arc<dyn KeyValueStore>,
    sink: Arc<dyn ConsoleSink>,
    threshold: AtomicU8,
    /// 读改写期间持有,保证多线程下追加与持久化的顺序一致
    entries: Mutex<VecDeque<LogEntry>>,
}

impl EventLog {
    /// 打开事件日志,加载已持久化的序列
    ///
    /// 键不存在时从空序列开始;内容无法解析时记录警告后同样从空序列开始。
    pub async fn open(
        store: Arc<dyn KeyValueStore>,
        sink: Arc<dyn ConsoleSink>,
        threshold: LogLevel,
    ) -> Self {
        let entries = match kv_store::load_json::<VecDeque<LogEntry>>(&*store, keys::SYSTEM_LOGS)
            .await
        {
            Ok(Some(mut entries)) => {
                while entries.len() > MAX_LOG_ENTRIES {
                    entries.pop_front();
                }
                entries
            }
            Ok(None) => VecDeque::new(),
            Err(e) => {
                tracing::warn!(error = %e, "Persisted system logs unreadable, starting empty");
                VecDeque::new()
            }
        };

        tracing::debug!(
            loaded = entries.len(),
            threshold = %threshold,
            "Event log opened"
        );

        Self {
            store,
            sink,
            threshold: AtomicU8::new(threshold.rank()),
            entries: Mutex::new(entries),
        }
    }

    /// 启动日志系统: 打开日志后以 INFO 记录一次启动
    ///
    /// 启动记录同样受阈值约束。
    pub async fn start(
        store: Arc<dyn KeyValueStore>,
        sink: Arc<dyn ConsoleSink>,
        threshold: LogLevel,
    ) -> Self {
        let log = Self::open(store, sink, threshold).await;
        if let Err(e) = log
            .info(
                STARTUP_MODULE,
                "Logging system initialized",
                Some(serde_json::json!({ "level": threshold.name() })),
            )
            .await
        {
            tracing::warn!(error = %e, "Failed to record logging startup");
        }
        log
    }

    /// 当前记录阈值
    pub fn threshold(&self) -> LogLevel {
        LogLevel::try_from(self.threshold.load(Ordering::SeqCst)).unwrap_or_default()
    }

    /// 修改记录阈值,立即生效
    ///
    /// 变更本身以 INFO 级别记录,同样受新阈值约束。
    pub async fn set_threshold(&self, level: LogLevel) -> Result<Option<LogEntry>, LogError> {
        self.threshold.store(level.rank(), Ordering::SeqCst);
        self.info(
            MODULE,
            "Log threshold changed",
            Some(serde_json::json!({ "level": level.name() })),
        )
        .await
    }

    /// 记录一条日志
    ///
    /// # 返回值
    /// - `Ok(Some(entry))`: 已记录
    /// - `Ok(None)`: 低于阈值,被忽略
    ///
    /// # 错误
    /// - `LogError::EmptyField`: `module` 或 `message` 为空
    /// - `LogError::InvalidData`: `data` 不是JSON对象
    pub async fn record(
        &self,
        level: LogLevel,
        module: &str,
        message: &str,
        data: Option<Value>,
    ) -> Result<Option<LogEntry>, LogError> {
        let entry = LogEntry::new(level, module, message, data)?;

        if level.rank() < self.threshold().rank() {
            return Ok(None);
        }

        let persisted = {
            let mut entries = self.entries.lock().await;
            entries.push_back(entry.clone());
            while entries.len() > MAX_LOG_ENTRIES {
                entries.pop_front();
            }
            kv_store::save_json(&*self.store, keys::SYSTEM_LOGS, &*entries).await
        };

        if let Err(e) = persisted {
            report_persist_failure(&e);
        }

        self.sink.emit(&entry);
        if level == LogLevel::Critical {
            self.sink.notify_critical(&entry);
        }

        Ok(Some(entry))
    }

    pub async fn debug(
        &self,
        module: &str,
        message: &str,
        data: Option<Value>,
    ) -> Result<Option<LogEntry>, LogError> {
        self.record(LogLevel::Debug, module, message, data).await
    }

    pub async fn info(
        &self,
        module: &str,
        message: &str,
        data: Option<Value>,
    ) -> Result<Option<LogEntry>, LogError> {
        self.record(LogLevel::Info, module, message, data).await
    }

    pub async fn warn(
        &self,
        module: &str,
        message: &str,
        data: Option<Value>,
    ) -> Result<Option<LogEntry>, LogError> {
        self.record(LogLevel::Warn, module, message, data).await
    }

    pub async fn error(
        &self,
        module: &str,
        message: &str,
        data: Option<Value>,
    ) -> Result<Option<LogEntry>, LogError> {
        self.record(LogLevel::Error, module, message, data).await
    }

    pub async fn critical(
        &self,
        module: &str,
        message: &str,
        data: Option<Value>,
    ) -> Result<Option<LogEntry>, LogError> {
        self.record(LogLevel::Critical, module, message, data).await
    }

    /// 当前日志序列的副本,最旧的在前
    pub async fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().await.iter().cloned().collect()
    }

    /// 按条件查询日志
    pub async fn query(&self, query: &LogQuery) -> Vec<LogEntry> {
        self.entries
            .lock()
            .await
            .iter()
            .filter(|entry| query.matches(entry))
            .cloned()
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    /// 清空日志并删除持久化键
    pub async fn clear(&self) {
        let mut entries = self.entries.lock().await;
        entries.clear();
        if let Err(e) = self.store.remove(keys::SYSTEM_LOGS).await {
            report_persist_failure(&e);
        }
        tracing::info!("System logs cleared");
    }
}

/// 日志自身的持久化失败无法再写回日志,只能交给 tracing
fn report_persist_failure(error: &StorageError) {
    tracing::error!(key = keys::SYSTEM_LOGS, error = %error, "Failed to persist system logs");
}
