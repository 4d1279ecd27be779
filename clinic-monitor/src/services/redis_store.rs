use async_trait::async_trait;
use deadpool_redis::{Config, Connection, Pool, Runtime};
use redis::AsyncCommands;

use crate::models::{RedisConfig, StorageError};
use crate::services::kv_store::KeyValueStore;

/// Redis键前缀,与同库的其他应用数据隔离
const KEY_PREFIX: &str = "clinic:";

/// Redis键值存储
///
/// 管理连接池,把日志、指标、活动记录以JSON字符串保存在 `clinic:{key}` 下。
/// 职责单一:仅处理数据持久化,不涉及业务逻辑。
pub struct RedisStore {
    pool: Pool,
}

impl RedisStore {
    /// 初始化Redis连接池
    ///
    /// 连接池惰性建立连接,此处不会访问服务器。
    ///
    /// # 错误
    /// 返回 `StorageError::RedisConnectionFailed` 如果连接池创建失败
    pub fn new(config: &RedisConfig) -> Result<Self, StorageError> {
        let redis_url = config.to_connection_url();
        let pool = Config::from_url(&redis_url)
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| {
                tracing::error!(
                    redis = %config.summary_for_logging(),
                    error = %e,
                    "Failed to create Redis pool"
                );
                StorageError::RedisConnectionFailed(e.to_string())
            })?;

        tracing::info!(redis = %config.summary_for_logging(), "Redis pool created");
        Ok(Self { pool })
    }

    fn namespaced(key: &str) -> String {
        format!("{}{}", KEY_PREFIX, key)
    }

    async fn connection(&self) -> Result<Connection, StorageError> {
        self.pool
            .get()
            .await
            .map_err(|e| StorageError::RedisConnectionFailed(e.to_string()))
    }

    /// 检查Redis连通性
    pub async fn ping(&self) -> Result<(), StorageError> {
        let mut conn = self.connection().await?;
        let pong: String = redis::cmd("PING").query_async(&mut *conn).await?;
        tracing::debug!(response = %pong, "Redis ping");
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut conn = self.connection().await?;
        let value: Option<String> = conn.get(Self::namespaced(key)).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        let mut conn = self.connection().await?;
        conn.set::<_, _, ()>(Self::namespaced(key), value).await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut conn = self.connection().await?;
        conn.del::<_, ()>(Self::namespaced(key)).await?;
        tracing::debug!(key = %key, "Removed key from Redis");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespaced_key() {
        assert_eq!(RedisStore::namespaced("system_logs"), "clinic:system_logs");
    }

    #[tokio::test]
    async fn test_pool_creation_is_lazy() {
        // 端口上没有服务也能创建连接池
        let config = RedisConfig::new("127.0.0.1".to_string(), 1);
        assert!(RedisStore::new(&config).is_ok());
    }
}
