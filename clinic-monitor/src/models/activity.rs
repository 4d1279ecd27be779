use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 匿名用户ID
pub const ANONYMOUS_ID: &str = "anonymous";
/// 匿名用户显示名
pub const ANONYMOUS_NAME: &str = "Anônimo";

/// 当前登录用户 (由外部认证层提供)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityUser {
    pub id: String,
    pub name: Option<String>,
}

impl ActivityUser {
    pub fn new(id: impl Into<String>, name: Option<String>) -> Self {
        Self {
            id: id.into(),
            name,
        }
    }
}

/// 用户活动记录 (页面访问与操作审计)
///
/// 持久化到 `activity_logs` 键。字段名采用camelCase,与面板读取的结构一致。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRecord {
    /// 用户ID,未登录时为 `anonymous`
    pub user_id: String,

    /// 用户名,未登录或无名称时为 `Anônimo`
    pub user_name: String,

    /// 时间戳
    pub timestamp: DateTime<Utc>,

    /// 访问路径
    pub path: String,

    /// 动作 (如 `page_view`)
    pub action: String,

    /// 用户代理字符串
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl ActivityRecord {
    /// 创建活动记录
    ///
    /// # 参数
    /// - `user`: 当前用户,`None` 表示匿名访问
    /// - `path`: 访问路径
    /// - `action`: 动作名称
    /// - `user_agent`: 用户代理 (可选)
    pub fn new(
        user: Option<&ActivityUser>,
        path: &str,
        action: &str,
        user_agent: Option<String>,
    ) -> Self {
        let (user_id, user_name) = match user {
            Some(user) => (
                user.id.clone(),
                user.name.clone().unwrap_or_else(|| ANONYMOUS_NAME.to_string()),
            ),
            None => (ANONYMOUS_ID.to_string(), ANONYMOUS_NAME.to_string()),
        };

        Self {
            user_id,
            user_name,
            timestamp: Utc::now(),
            path: path.to_string(),
            action: action.to_string(),
            user_agent,
        }
    }

    /// 创建页面访问记录
    ///
    /// # 示例
    /// ```
    /// use clinic_monitor::models::ActivityRecord;
    ///
    /// let record = ActivityRecord::page_view(None, "/agendamentos", None);
    /// assert_eq!(record.action, "page_view");
    /// assert_eq!(record.user_id, "anonymous");
    /// ```
    pub fn page_view(user: Option<&ActivityUser>, path: &str, user_agent: Option<String>) -> Self {
        Self::new(user, path, "page_view", user_agent)
    }
}
