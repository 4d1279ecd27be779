use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 日志调用相关错误
///
/// 这些错误代表调用方的编程错误,而非运行时状况。
/// 直接拒绝,不做静默修正,保证监控面板后续过滤时日志的完整性。
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[serde(tag = "error", content = "details")]
pub enum LogError {
    /// 无效的日志级别
    ///
    /// 名称不属于 DEBUG/INFO/WARN/ERROR/CRITICAL,或等级超出 0-4
    #[error("无效的日志级别: {0}")]
    InvalidLevel(String),

    /// 必填字段为空
    ///
    /// `module` 与 `message` 都必须是非空字符串
    #[error("字段不能为空: {0}")]
    EmptyField(String),

    /// 附加数据格式无效
    ///
    /// `data` 必须是JSON对象
    #[error("附加数据必须是JSON对象,实际为: {0}")]
    InvalidData(String),
}

/// 存储相关错误
///
/// 处理与键值存储 (内存或Redis) 交互时的失败场景
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[serde(tag = "error", content = "details")]
pub enum StorageError {
    /// Redis连接失败
    ///
    /// 无法建立或维持与Redis服务器的连接
    #[error("Redis连接失败: {0}")]
    RedisConnectionFailed(String),

    /// 序列化/反序列化失败
    ///
    /// 将数据转换为JSON或从JSON解析失败
    #[error("数据序列化失败: {0}")]
    SerializationError(String),

    /// Redis操作超时
    #[error("Redis操作超时: {0}")]
    OperationTimeout(String),

    /// 存储命令执行失败
    ///
    /// 具体的GET/SET/DEL命令执行出错
    #[error("存储命令执行失败: {0}")]
    CommandFailed(String),

    /// 存储不可用
    ///
    /// 后端被关闭或被显式禁用
    #[error("存储不可用: {0}")]
    Unavailable(String),
}

/// 性能监控相关错误
#[derive(Debug, Error)]
pub enum MonitorError {
    /// 监控自身写日志时违反了输入约束
    #[error(transparent)]
    Log(#[from] LogError),

    /// 启用了panic捕获,但当前不在tokio运行时内
    #[error("panic捕获需要在tokio运行时内初始化")]
    RuntimeUnavailable,

    /// 进程内已有另一个监控器安装了panic捕获
    #[error("panic捕获已被其他监控器安装")]
    PanicCaptureActive,
}

/// 配置加载错误
#[derive(Debug, Error, Serialize, Deserialize)]
#[serde(tag = "error", content = "details")]
pub enum ConfigError {
    /// 配置项取值无效
    #[error("配置项 {key} 的取值无效: {value}")]
    InvalidValue { key: String, value: String },

    /// 读取 .env 文件失败
    #[error("I/O错误: {0}")]
    IoError(String),
}

/// 实现从redis::RedisError到StorageError的转换
impl From<redis::RedisError> for StorageError {
    fn from(err: redis::RedisError) -> Self {
        if err.is_connection_refusal() {
            StorageError::RedisConnectionFailed("连接被拒绝".to_string())
        } else if err.is_timeout() {
            StorageError::OperationTimeout(err.to_string())
        } else {
            StorageError::CommandFailed(err.to_string())
        }
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::SerializationError(err.to_string())
    }
}

impl From<dotenvy::Error> for ConfigError {
    fn from(err: dotenvy::Error) -> Self {
        ConfigError::IoError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_error_serialization() {
        let err = LogError::EmptyField("module".to_string());
        let json = serde_json::to_string(&err).unwrap();
        assert_eq!(json, r#"{"error":"EmptyField","details":"module"}"#);
    }

    #[test]
    fn test_storage_error_from_json() {
        let json_err = serde_json::from_str::<Vec<u8>>("{").unwrap_err();
        let err: StorageError = json_err.into();
        assert!(matches!(err, StorageError::SerializationError(_)));
    }

    #[test]
    fn test_monitor_error_wraps_log_error() {
        let err: MonitorError = LogError::InvalidLevel("TRACE".to_string()).into();
        assert_eq!(err.to_string(), "无效的日志级别: TRACE");
    }
}
