//! 系统日志命令
//!
//! 面板与各页面写入、查询系统日志的入口。
//! 级别以字符串传入,无法识别的级别直接拒绝。

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

use crate::models::log_query::{distinct_levels, distinct_modules};
use crate::models::{LogEntry, LogLevel, LogQuery};
use crate::state::AppState;

/// 页面提交的日志事件
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEventRequest {
    /// 级别名称: DEBUG/INFO/WARN/ERROR/CRITICAL
    pub level: String,
    /// 来源模块
    pub module: String,
    /// 日志消息
    pub message: String,
    /// 附加数据 (JSON对象)
    #[serde(default)]
    pub data: Option<Value>,
}

/// 日志查询结果
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogQueryResponse {
    /// 命中的日志
    pub entries: Vec<LogEntry>,
    /// 日志总数
    pub total: usize,
    /// 出现过的级别,用于筛选下拉框
    pub levels: Vec<LogLevel>,
    /// 出现过的模块,用于筛选下拉框
    pub modules: Vec<String>,
}

/// 记录单条日志事件
///
/// 返回值:
/// - `Ok(Some(entry))`: 已记录
/// - `Ok(None)`: 低于当前阈值,被忽略
/// - `Err(String)`: 级别无效或字段为空
pub async fn log_event(
    state: &AppState,
    request: LogEventRequest,
) -> Result<Option<LogEntry>, String> {
    let level = LogLevel::from_str(&request.level).map_err(|e| e.to_string())?;
    state
        .event_log
        .record(level, &request.module, &request.message, request.data)
        .await
        .map_err(|e| {
            tracing::warn!(
                module = %request.module,
                error = %e,
                "Rejected log event"
            );
            e.to_string()
        })
}

/// 批量记录日志
///
/// 每条日志独立处理,单条失败不影响其他日志;返回实际记录的条数。
pub async fn log_batch(state: &AppState, requests: Vec<LogEventRequest>) -> Result<usize, String> {
    let mut recorded = 0;
    let mut rejected = 0;
    for request in requests {
        match log_event(state, request).await {
            Ok(Some(_)) => recorded += 1,
            Ok(None) => {}
            Err(_) => rejected += 1,
        }
    }

    if rejected > 0 {
        tracing::warn!(recorded, rejected, "Log batch partially rejected");
    }
    Ok(recorded)
}

/// 修改日志阈值
pub async fn set_log_threshold(state: &AppState, level: String) -> Result<String, String> {
    let level = LogLevel::from_str(&level).map_err(|e| e.to_string())?;
    state
        .event_log
        .set_threshold(level)
        .await
        .map_err(|e| e.to_string())?;
    Ok(level.name().to_string())
}

/// 查询日志
pub async fn query_logs(state: &AppState, query: LogQuery) -> Result<LogQueryResponse, String> {
    let all = state.event_log.entries().await;
    let entries = query.apply(&all).into_iter().cloned().collect();

    Ok(LogQueryResponse {
        entries,
        total: all.len(),
        levels: distinct_levels(&all),
        modules: distinct_modules(&all),
    })
}
