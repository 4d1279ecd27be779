//! 性能指标命令
//!
//! 监控面板读取和重置指标的入口。面板只读取快照,不直接修改。

use serde::{Deserialize, Serialize};

use crate::models::MetricsSnapshot;
use crate::state::AppState;

/// 指标概览
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsOverview {
    /// 完整快照
    pub snapshot: MetricsSnapshot,
    /// 最近样本的平均耗时 (毫秒)
    pub average_response_ms: Option<f64>,
    /// 错误占API调用的比例
    pub error_rate: Option<f64>,
}

/// 获取当前指标快照
pub async fn get_metrics(state: &AppState) -> Result<MetricsSnapshot, String> {
    Ok(state.monitor.get_metrics().await)
}

/// 获取指标概览
pub async fn get_metrics_overview(state: &AppState) -> Result<MetricsOverview, String> {
    let snapshot = state.monitor.get_metrics().await;
    let average_response_ms = snapshot.average_duration();
    let error_rate = if snapshot.api_calls == 0 {
        None
    } else {
        Some(snapshot.errors as f64 / snapshot.api_calls as f64)
    };

    Ok(MetricsOverview {
        snapshot,
        average_response_ms,
        error_rate,
    })
}

/// 清零指标
pub async fn clear_metrics(state: &AppState) -> Result<(), String> {
    state.monitor.clear_metrics().await;
    tracing::info!("Metrics cleared from dashboard");
    Ok(())
}
