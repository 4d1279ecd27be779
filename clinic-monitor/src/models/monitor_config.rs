use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::log_entry::LogLevel;

/// 存储后端
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// 进程内存储,进程退出即丢失
    #[default]
    Memory,
    /// Redis存储,跨进程持久化
    Redis,
}

/// Redis连接配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedisConfig {
    /// 服务器主机地址
    pub host: String,

    /// 服务器端口,默认 6379
    pub port: u16,

    /// 认证密码 (可选)
    pub password: Option<String>,

    /// 数据库索引 (0-15,默认0)
    pub database: Option<u8>,
}

impl RedisConfig {
    pub fn new(host: String, port: u16) -> Self {
        Self {
            host,
            port,
            password: None,
            database: None,
        }
    }

    /// 设置密码 (构建器模式)
    pub fn with_password(mut self, password: String) -> Self {
        self.password = Some(password);
        self
    }

    /// 设置数据库索引 (构建器模式)
    pub fn with_database(mut self, database: u8) -> Self {
        self.database = Some(database);
        self
    }

    /// 生成Redis连接URL
    ///
    /// # 示例
    /// ```
    /// use clinic_monitor::models::RedisConfig;
    ///
    /// let config = RedisConfig::new("localhost".to_string(), 6380)
    ///     .with_password("secret".to_string())
    ///     .with_database(1);
    ///
    /// assert_eq!(config.to_connection_url(), "redis://:secret@localhost:6380/1");
    /// ```
    pub fn to_connection_url(&self) -> String {
        let auth = match &self.password {
            Some(pwd) => format!(":{}@", pwd),
            None => String::new(),
        };

        format!(
            "redis://{}{}:{}/{}",
            auth,
            self.host,
            self.port,
            self.database.unwrap_or(0)
        )
    }

    /// 获取配置摘要 (用于日志,不记录密码)
    pub fn summary_for_logging(&self) -> String {
        let auth_hint = if self.password.is_some() {
            " (authenticated)"
        } else {
            ""
        };
        format!(
            "{}:{}/{}{}",
            self.host,
            self.port,
            self.database.unwrap_or(0),
            auth_hint
        )
    }
}

impl Default for RedisConfig {
    /// 默认配置: localhost:6379, 无密码, 数据库0
    fn default() -> Self {
        Self::new("localhost".to_string(), 6379)
    }
}

/// 监控核心配置
///
/// 由 `ConfigService` 从环境变量与 `.env` 文件加载
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// 日志记录阈值,低于该级别的日志不会被记录
    pub log_threshold: LogLevel,

    /// 是否安装panic钩子,把未处理的panic计入错误指标
    pub capture_panics: bool,

    /// 存储后端
    pub store_backend: StoreBackend,

    /// Redis配置,仅在 `store_backend = redis` 时使用
    pub redis: RedisConfig,

    /// tracing日志文件目录
    pub log_dir: PathBuf,

    /// 出站HTTP调用超时 (秒)
    pub http_timeout_secs: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            log_threshold: LogLevel::Info,
            capture_panics: true,
            store_backend: StoreBackend::Memory,
            redis: RedisConfig::default(),
            log_dir: PathBuf::from("logs"),
            http_timeout_secs: 30,
        }
    }
}

impl MonitorConfig {
    /// 关闭panic捕获 (测试与嵌入场景)
    pub fn without_panic_capture(mut self) -> Self {
        self.capture_panics = false;
        self
    }

    pub fn with_threshold(mut self, level: LogLevel) -> Self {
        self.log_threshold = level;
        self
    }
}
