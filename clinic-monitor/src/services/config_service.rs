use std::path::PathBuf;
use std::str::FromStr;

use crate::models::{ConfigError, LogLevel, MonitorConfig, RedisConfig, StoreBackend};

/// 配置服务
///
/// 从环境变量加载监控核心配置,启动时先读取 `.env` 文件 (存在时)。
/// 未设置的配置项使用默认值,设置了但无法解析的配置项直接报错。
pub struct ConfigService;

impl ConfigService {
    /// 加载配置
    ///
    /// 读取环境变量:
    /// - LOG_THRESHOLD: 日志阈值 (默认: INFO)
    /// - CAPTURE_PANICS: 是否捕获panic (默认: true)
    /// - STORE_BACKEND: memory | redis (默认: memory)
    /// - REDIS_HOST / REDIS_PORT / REDIS_PASSWORD / REDIS_DATABASE
    /// - LOG_DIR: 日志文件目录 (默认: logs)
    /// - HTTP_TIMEOUT_SECS: 出站调用超时 (默认: 30)
    pub fn load() -> Result<MonitorConfig, ConfigError> {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!(path = %path.display(), "Loaded .env file"),
            Err(e) if e.not_found() => tracing::debug!(".env file not found, using environment"),
            Err(e) => return Err(e.into()),
        }

        let config = Self::from_lookup(|key| std::env::var(key).ok())?;

        tracing::info!(
            threshold = %config.log_threshold,
            backend = ?config.store_backend,
            redis = %config.redis.summary_for_logging(),
            capture_panics = config.capture_panics,
            "Monitor configuration loaded"
        );

        Ok(config)
    }

    /// 从任意键值来源构建配置
    pub fn from_lookup<F>(lookup: F) -> Result<MonitorConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = MonitorConfig::default();

        let log_threshold = match get("LOG_THRESHOLD") {
            Some(raw) => LogLevel::from_str(&raw).map_err(|_| invalid("LOG_THRESHOLD", &raw))?,
            None => defaults.log_threshold,
        };

        let capture_panics = match get("CAPTURE_PANICS") {
            Some(raw) => parse_bool(&raw).ok_or_else(|| invalid("CAPTURE_PANICS", &raw))?,
            None => defaults.capture_panics,
        };

        let store_backend = match get("STORE_BACKEND").map(|v| v.to_ascii_lowercase()) {
            Some(raw) if raw == "memory" => StoreBackend::Memory,
            Some(raw) if raw == "redis" => StoreBackend::Redis,
            Some(raw) => return Err(invalid("STORE_BACKEND", &raw)),
            None => defaults.store_backend,
        };

        let host = get("REDIS_HOST").unwrap_or_else(|| "localhost".to_string());
        let port = match get("REDIS_PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|_| invalid("REDIS_PORT", &raw))?,
            None => 6379,
        };

        let mut redis = RedisConfig::new(host, port);
        if let Some(password) = get("REDIS_PASSWORD") {
            redis = redis.with_password(password);
        }
        if let Some(raw) = get("REDIS_DATABASE") {
            // Redis默认只有 0-15 号库
            let db = raw
                .parse::<u8>()
                .ok()
                .filter(|db| *db <= 15)
                .ok_or_else(|| invalid("REDIS_DATABASE", &raw))?;
            redis = redis.with_database(db);
        }

        let log_dir = get("LOG_DIR").map(PathBuf::from).unwrap_or(defaults.log_dir);

        let http_timeout_secs = match get("HTTP_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| invalid("HTTP_TIMEOUT_SECS", &raw))?,
            None => defaults.http_timeout_secs,
        };

        Ok(MonitorConfig {
            log_threshold,
            capture_panics,
            store_backend,
            redis,
            log_dir,
            http_timeout_secs,
        })
    }
}

fn invalid(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
