//! 数据模型模块
//!
//! 包含所有核心数据结构:
//! - errors: 错误类型定义 (日志输入、存储、监控、配置)
//! - log_entry: 系统日志条目与级别
//! - log_query: 面板日志查询条件
//! - metrics: 性能指标快照
//! - activity: 用户活动记录
//! - monitor_config: 监控核心配置

pub mod activity;
pub mod errors;
pub mod log_entry;
pub mod log_query;
pub mod metrics;
pub mod monitor_config;

// 重导出常用类型,简化外部引用
pub use activity::{ActivityRecord, ActivityUser};
pub use errors::{ConfigError, LogError, MonitorError, StorageError};
pub use log_entry::{LogEntry, LogLevel};
pub use log_query::LogQuery;
pub use metrics::{MetricsSnapshot, ResponseSample, MAX_RESPONSE_SAMPLES};
pub use monitor_config::{MonitorConfig, RedisConfig, StoreBackend};
