//! 日志查询条件
//!
//! 监控面板的只读视图: 按级别、模块精确筛选,按消息内容模糊检索。

use serde::{Deserialize, Serialize};

use super::log_entry::{LogEntry, LogLevel};

/// 日志查询条件,所有条件同时满足才命中
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogQuery {
    /// 精确匹配级别,`None` 表示全部
    #[serde(default)]
    pub level: Option<LogLevel>,
    /// 精确匹配模块,`None` 表示全部
    #[serde(default)]
    pub module: Option<String>,
    /// 消息包含的关键字 (忽略大小写)
    #[serde(default)]
    pub search: Option<String>,
}

impl LogQuery {
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = Some(level);
        self
    }

    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// 判断单条日志是否命中
    pub fn matches(&self, entry: &LogEntry) -> bool {
        if let Some(level) = self.level {
            if entry.level != level {
                return false;
            }
        }
        if let Some(ref module) = self.module {
            if &entry.module != module {
                return false;
            }
        }
        match self.search.as_deref().map(str::trim) {
            Some(needle) if !needle.is_empty() => entry
                .message
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            _ => true,
        }
    }

    /// 过滤日志,保持原有顺序
    pub fn apply<'a>(&self, entries: &'a [LogEntry]) -> Vec<&'a LogEntry> {
        entries.iter().filter(|entry| self.matches(entry)).collect()
    }
}

/// 出现过的级别,按首次出现顺序
pub fn distinct_levels(entries: &[LogEntry]) -> Vec<LogLevel> {
    let mut levels = Vec::new();
    for entry in entries {
        if !levels.contains(&entry.level) {
            levels.push(entry.level);
        }
    }
    levels
}

/// 出现过的模块,按首次出现顺序
pub fn distinct_modules(entries: &[LogEntry]) -> Vec<String> {
    let mut modules: Vec<String> = Vec::new();
    for entry in entries {
        if !modules.iter().any(|m| m == &entry.module) {
            modules.push(entry.module.clone());
        }
    }
    modules
}
