use crate::models::{MonitorConfig, StoreBackend};
use crate::services::{
    ActivityLogger, ApiClient, ConsoleSink, EventLog, KeyValueStore, MemoryStore,
    PerformanceMonitor, RedisStore, TracingSink,
};
use std::sync::Arc;
use std::time::Duration;

/// 应用全局状态
///
/// 组合根: 每个服务只在这里构造一次,以 `Arc` 句柄传递给使用方
/// - store: 共享键值存储
/// - event_log: 系统日志
/// - monitor: 性能指标
/// - activity: 用户活动审计
/// - api_client: 被监控的出站HTTP客户端
pub struct AppState {
    pub store: Arc<dyn KeyValueStore>,
    pub event_log: Arc<EventLog>,
    pub monitor: Arc<PerformanceMonitor>,
    pub activity: Arc<ActivityLogger>,
    pub api_client: Arc<ApiClient>,
}

impl AppState {
    /// 按配置初始化应用状态
    ///
    /// 只构造服务,不安装埋点;埋点由 `monitor.initialize` 负责。
    ///
    /// # 错误
    /// Redis连接池或HTTP客户端创建失败时返回错误
    pub async fn new(config: &MonitorConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let store: Arc<dyn KeyValueStore> = match config.store_backend {
            StoreBackend::Memory => Arc::new(MemoryStore::new()),
            StoreBackend::Redis => Arc::new(RedisStore::new(&config.redis)?),
        };
        let api_client = Arc::new(ApiClient::new(Duration::from_secs(
            config.http_timeout_secs,
        ))?);

        let state = Self::with_parts(store, Arc::new(TracingSink), api_client, config).await;

        tracing::info!(
            backend = ?config.store_backend,
            threshold = %config.log_threshold,
            "AppState initialized"
        );

        Ok(state)
    }

    /// 用现成的存储、输出通道和客户端组装状态
    pub async fn with_parts(
        store: Arc<dyn KeyValueStore>,
        sink: Arc<dyn ConsoleSink>,
        api_client: Arc<ApiClient>,
        config: &MonitorConfig,
    ) -> Self {
        let event_log =
            Arc::new(EventLog::start(Arc::clone(&store), sink, config.log_threshold).await);
        let monitor = Arc::new(PerformanceMonitor::new(
            Arc::clone(&store),
            Arc::clone(&event_log),
            config,
        ));
        let activity = Arc::new(ActivityLogger::open(Arc::clone(&store)).await);

        Self {
            store,
            event_log,
            monitor,
            activity,
            api_client,
        }
    }
}
