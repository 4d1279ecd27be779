//! 用户活动命令
//!
//! 路由层每次页面切换调用 `record_page_view`,审计视图通过 `list_activity` 读取。

use serde::{Deserialize, Serialize};

use crate::models::{ActivityRecord, ActivityUser};
use crate::state::AppState;

/// 页面访问事件
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageViewRequest {
    pub path: String,
    #[serde(default)]
    pub user: Option<ActivityUser>,
    #[serde(default)]
    pub user_agent: Option<String>,
}

/// 记录页面访问
pub async fn record_page_view(
    state: &AppState,
    request: PageViewRequest,
) -> Result<ActivityRecord, String> {
    if request.path.trim().is_empty() {
        return Err("路径不能为空".to_string());
    }

    Ok(state
        .activity
        .page_view(request.user.as_ref(), &request.path, request.user_agent)
        .await)
}

/// 列出最近的活动记录,最新的在前
///
/// `limit` 为 `None` 时返回全部
pub async fn list_activity(
    state: &AppState,
    limit: Option<usize>,
) -> Result<Vec<ActivityRecord>, String> {
    let records = state.activity.records().await;
    let limit = limit.unwrap_or(records.len());
    Ok(records.into_iter().rev().take(limit).collect())
}
