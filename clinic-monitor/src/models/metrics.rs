//! 性能指标快照
//!
//! 持久化到 `performance_metrics` 键。字段名采用camelCase,
//! 与监控面板读取的文档结构一致。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// 响应时间样本最多保留条数
pub const MAX_RESPONSE_SAMPLES: usize = 100;

/// 单次API调用耗时样本
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseSample {
    /// 请求URL
    pub url: String,
    /// 耗时 (毫秒)
    pub duration: f64,
    /// 记录时刻
    pub timestamp: DateTime<Utc>,
}

/// 指标快照
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    /// 页面加载次数 (每次监控初始化加一)
    #[serde(default)]
    pub page_loads: u64,
    /// 已完成的API调用次数 (成功或失败的HTTP响应)
    #[serde(default)]
    pub api_calls: u64,
    /// 错误次数 (未处理panic与失败的网络调用)
    #[serde(default)]
    pub errors: u64,
    /// 最近的响应时间样本,最旧的在前
    #[serde(default)]
    pub response_time: VecDeque<ResponseSample>,
}

impl MetricsSnapshot {
    /// 追加一条耗时样本,超出上限时淘汰最旧的
    pub fn push_sample(&mut self, sample: ResponseSample) {
        self.response_time.push_back(sample);
        while self.response_time.len() > MAX_RESPONSE_SAMPLES {
            self.response_time.pop_front();
        }
    }

    /// 样本平均耗时 (毫秒),无样本时为 `None`
    pub fn average_duration(&self) -> Option<f64> {
        if self.response_time.is_empty() {
            return None;
        }
        let total: f64 = self.response_time.iter().map(|s| s.duration).sum();
        Some(total / self.response_time.len() as f64)
    }

    /// 是否为全零状态
    pub fn is_empty(&self) -> bool {
        *self == MetricsSnapshot::default()
    }
}
