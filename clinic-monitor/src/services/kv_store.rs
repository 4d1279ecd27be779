//! 键值存储抽象
//!
//! 日志、指标、活动记录共用同一个字符串键值存储,值为JSON文本。
//! 后端可以是进程内存储 (`MemoryStore`) 或 Redis (`RedisStore`)。

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::models::StorageError;

/// 持久化键
pub mod keys {
    /// 系统日志序列
    pub const SYSTEM_LOGS: &str = "system_logs";
    /// 性能指标快照
    pub const PERFORMANCE_METRICS: &str = "performance_metrics";
    /// 用户活动序列
    pub const ACTIVITY_LOGS: &str = "activity_logs";
}

/// 字符串键值存储
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// 读取键,不存在时返回 `None`
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// 写入键,覆盖旧值
    async fn set(&self, key: &str, value: String) -> Result<(), StorageError>;

    /// 删除键,不存在也视为成功
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// 读取并反序列化JSON值
pub async fn load_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StorageError> {
    match store.get(key).await? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// 序列化为JSON并写入
pub async fn save_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(value)?;
    store.set(key, raw).await
}

/// 进程内存储
///
/// 克隆后共享同一份数据,适合测试和不需要跨进程保留的运行方式。
#[derive(Clone, Default)]
pub struct MemoryStore {
    storage: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前键数量
    pub async fn len(&self) -> usize {
        self.storage.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.storage.lock().await.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.storage.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        self.storage.lock().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.storage.lock().await.remove(key);
        Ok(())
    }
}
