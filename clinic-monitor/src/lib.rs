//! 诊所预约管理后台的事件日志与性能监控核心
//!
//! - `services::EventLog`: 分级、有上限的系统事件日志
//! - `services::PerformanceMonitor`: 页面加载、API调用、错误计数与响应耗时
//! - `services::ActivityLogger`: 用户活动审计
//! - `commands`: 面板调用入口
//!
//! 所有服务由 `state::AppState` 统一构造,不使用全局单例。

pub mod commands;
pub mod models;
pub mod services;
pub mod state;
pub mod utils;

pub use state::AppState;
