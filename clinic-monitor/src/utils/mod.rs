//! 工具模块
//!
//! - logger: tracing 订阅器初始化

pub mod logger;
