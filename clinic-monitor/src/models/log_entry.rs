//! 系统日志模型
//!
//! 定义事件日志的数据结构,持久化到 `system_logs` 键,供监控面板过滤和检索。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use super::errors::LogError;

/// 日志级别
///
/// 等级由判别值显式给出,严重程度依次递增。
/// 序列化为大写名称,与面板的级别筛选保持一致。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Debug = 0,
    Info = 1,
    Warn = 2,
    Error = 3,
    Critical = 4,
}

impl LogLevel {
    /// 全部级别,按等级升序
    pub const ALL: [LogLevel; 5] = [
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
        LogLevel::Critical,
    ];

    /// 严重程度等级 (0-4)
    pub const fn rank(self) -> u8 {
        self as u8
    }

    /// 大写名称
    pub const fn name(self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Critical => "CRITICAL",
        }
    }
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::Info
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LogLevel {
    type Err = LogError;

    /// 按名称解析,忽略大小写和首尾空白
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase();
        LogLevel::ALL
            .into_iter()
            .find(|level| level.name() == normalized)
            .ok_or_else(|| LogError::InvalidLevel(s.to_string()))
    }
}

impl TryFrom<u8> for LogLevel {
    type Error = LogError;

    fn try_from(rank: u8) -> Result<Self, LogError> {
        LogLevel::ALL
            .get(rank as usize)
            .copied()
            .ok_or_else(|| LogError::InvalidLevel(rank.to_string()))
    }
}

/// 单条系统日志
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// 写入时刻
    pub timestamp: DateTime<Utc>,
    /// 日志级别
    pub level: LogLevel,
    /// 来源模块
    pub module: String,
    /// 日志消息
    pub message: String,
    /// 附加结构化数据
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl LogEntry {
    /// 创建日志条目,时间戳取当前时刻
    ///
    /// # 错误
    /// - `LogError::EmptyField`: `module` 或 `message` 为空
    /// - `LogError::InvalidData`: `data` 不是JSON对象
    pub fn new(
        level: LogLevel,
        module: &str,
        message: &str,
        data: Option<Value>,
    ) -> Result<Self, LogError> {
        if module.trim().is_empty() {
            return Err(LogError::EmptyField("module".to_string()));
        }
        if message.trim().is_empty() {
            return Err(LogError::EmptyField("message".to_string()));
        }

        let data = match data {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(map)) => map,
            Some(other) => return Err(LogError::InvalidData(json_kind(&other).to_string())),
        };

        Ok(Self {
            timestamp: Utc::now(),
            level,
            module: module.to_string(),
            message: message.to_string(),
            data,
        })
    }

    /// 控制台输出格式: `[LEVEL] module: message`
    pub fn console_line(&self) -> String {
        format!("[{}] {}: {}", self.level, self.module, self.message)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
