use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::models::{ActivityRecord, ActivityUser, StorageError};
use crate::services::kv_store::{self, keys, KeyValueStore};

/// 活动记录最多保留条数
pub const MAX_ACTIVITY_RECORDS: usize = 1000;

/// 用户活动记录服务
///
/// 记录页面访问与操作,持久化到 `activity_logs`,供监控面板的审计视图读取。
pub struct ActivityLogger {
    store: Arc<dyn KeyValueStore>,
    records: Mutex<VecDeque<ActivityRecord>>,
}

impl ActivityLogger {
    /// 打开活动记录,加载已持久化的序列
    pub async fn open(store: Arc<dyn KeyValueStore>) -> Self {
        let records =
            match kv_store::load_json::<VecDeque<ActivityRecord>>(&*store, keys::ACTIVITY_LOGS)
                .await
            {
                Ok(records) => records.unwrap_or_default(),
                Err(e) => {
                    tracing::warn!(error = %e, "Persisted activity logs unreadable, starting empty");
                    VecDeque::new()
                }
            };

        Self {
            store,
            records: Mutex::new(records),
        }
    }

    /// 记录一次用户活动
    ///
    /// 持久化失败只记录错误,活动仍保留在内存中。
    pub async fn log_activity(
        &self,
        user: Option<&ActivityUser>,
        path: &str,
        action: &str,
        user_agent: Option<String>,
    ) -> ActivityRecord {
        let record = ActivityRecord::new(user, path, action, user_agent);

        tracing::info!(
            user_id = %record.user_id,
            path = %record.path,
            action = %record.action,
            "Activity logged"
        );

        let persisted = {
            let mut records = self.records.lock().await;
            records.push_back(record.clone());
            while records.len() > MAX_ACTIVITY_RECORDS {
                records.pop_front();
            }
            kv_store::save_json(&*self.store, keys::ACTIVITY_LOGS, &*records).await
        };
        if let Err(e) = persisted {
            report_persist_failure(&e);
        }

        record
    }

    /// 记录页面访问
    pub async fn page_view(
        &self,
        user: Option<&ActivityUser>,
        path: &str,
        user_agent: Option<String>,
    ) -> ActivityRecord {
        self.log_activity(user, path, "page_view", user_agent).await
    }

    /// 活动记录副本,最旧的在前
    pub async fn records(&self) -> Vec<ActivityRecord> {
        self.records.lock().await.iter().cloned().collect()
    }

    /// 清空活动记录并删除持久化键
    pub async fn clear(&self) {
        let mut records = self.records.lock().await;
        records.clear();
        if let Err(e) = self.store.remove(keys::ACTIVITY_LOGS).await {
            report_persist_failure(&e);
        }
    }
}

fn report_persist_failure(error: &StorageError) {
    tracing::error!(key = keys::ACTIVITY_LOGS, error = %error, "Failed to persist activity logs");
}
