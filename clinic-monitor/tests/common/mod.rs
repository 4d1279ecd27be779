//! 测试公共模块
//!
//! 提供记录型输出通道、可故障的存储和一次性HTTP服务,避免外部依赖。
#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use clinic_monitor::models::{LogEntry, MonitorConfig, StorageError};
use clinic_monitor::services::{ApiClient, ConsoleSink, KeyValueStore, MemoryStore};
use clinic_monitor::AppState;

/// 记录型控制台输出
#[derive(Default)]
pub struct RecordingSink {
    lines: Mutex<Vec<String>>,
    notifications: Mutex<Vec<LogEntry>>,
}

impl RecordingSink {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    pub fn notifications(&self) -> Vec<LogEntry> {
        self.notifications.lock().unwrap().clone()
    }
}

impl ConsoleSink for RecordingSink {
    fn emit(&self, entry: &LogEntry) {
        self.lines.lock().unwrap().push(entry.console_line());
    }

    fn notify_critical(&self, entry: &LogEntry) {
        self.notifications.lock().unwrap().push(entry.clone());
    }
}

/// 可切换故障的存储
///
/// 正常时委托给内存存储;故障时所有操作返回 `StorageError::Unavailable`
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    failing: AtomicBool,
}

impl FlakyStore {
    pub fn failing() -> Self {
        let store = Self::default();
        store.set_failing(true);
        store
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), StorageError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(StorageError::Unavailable("存储已关闭".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl KeyValueStore for FlakyStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.check()?;
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        self.check()?;
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.check()?;
        self.inner.remove(key).await
    }
}

/// 测试环境: 内存存储 + 记录型输出 + 不捕获panic
pub struct TestEnv {
    pub state: AppState,
    pub store: MemoryStore,
    pub sink: Arc<RecordingSink>,
}

pub async fn test_env(config: MonitorConfig) -> TestEnv {
    clinic_monitor::utils::logger::init_for_tests();

    let store = MemoryStore::new();
    let sink = Arc::new(RecordingSink::default());
    // 本地测试服务不走代理
    let http = reqwest::Client::builder().no_proxy().build().unwrap();
    let api_client = Arc::new(ApiClient::from_client(http));
    let state = AppState::with_parts(
        Arc::new(store.clone()),
        sink.clone(),
        api_client,
        &config.without_panic_capture(),
    )
    .await;

    TestEnv { state, store, sink }
}

/// 启动一次性HTTP服务,对每个请求返回固定响应
///
/// 返回服务根地址,如 `http://127.0.0.1:40123`
pub async fn spawn_http_server(status_line: &'static str, body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status_line,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    format!("http://{}", addr)
}

/// 获取一个当前无人监听的本地地址
pub fn closed_local_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/api/agendamentos", addr)
}
