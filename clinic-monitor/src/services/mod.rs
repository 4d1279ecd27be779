//! 服务层模块
//!
//! 包含监控核心的所有服务:
//! - `kv_store`: 键值存储抽象与进程内实现
//! - `redis_store`: Redis存储后端
//! - `event_log`: 分级事件日志
//! - `performance_monitor`: 性能指标采集与埋点
//! - `api_client`: 可被拦截的出站HTTP客户端
//! - `activity_logger`: 用户活动审计
//! - `config_service`: 配置加载
//!
//! # 服务架构
//!
//! ```text
//! ┌──────────────────────┐
//! │  Dashboard Commands  │
//! └──────────┬───────────┘
//!            │
//!            ▼
//! ┌─────────────────────────────────────────────┐
//! │  PerformanceMonitor ──▶ EventLog            │
//! │        ▲                   │                │
//! │   ApiClient (拦截器槽位)    │  ActivityLogger │
//! │        │                   ▼        │       │
//! │        │           KeyValueStore ◀──┘       │
//! └────────┼───────────────────┼────────────────┘
//!          ▼                   ▼
//!     外部HTTP服务        Memory / Redis
//! ```

pub mod activity_logger;
pub mod api_client;
pub mod config_service;
pub mod event_log;
pub mod kv_store;
pub mod performance_monitor;
pub mod redis_store;

// 重导出常用类型,简化外部引用
pub use activity_logger::ActivityLogger;
pub use api_client::{ApiClient, CallInterceptor};
pub use config_service::ConfigService;
pub use event_log::{ConsoleSink, EventLog, TracingSink, MAX_LOG_ENTRIES};
pub use kv_store::{KeyValueStore, MemoryStore};
pub use performance_monitor::PerformanceMonitor;
pub use redis_store::RedisStore;
