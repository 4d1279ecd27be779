use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// 出站调用拦截器
///
/// 只做记账,不能改变调用结果。
#[async_trait]
pub trait CallInterceptor: Send + Sync {
    /// 收到HTTP响应 (任意状态码)
    async fn on_completed(&self, url: &str, duration_ms: f64, status: u16);

    /// 请求失败 (连接失败、超时等),随后原错误会返回给调用方
    async fn on_failed(&self, url: &str, message: &str);
}

/// 可被监控的HTTP客户端
///
/// 包装 `reqwest::Client`,持有唯一的拦截器槽位:
/// 重复安装只会替换,不会叠加,每次调用最多被记录一次。
pub struct ApiClient {
    http: reqwest::Client,
    interceptor: RwLock<Option<Arc<dyn CallInterceptor>>>,
}

impl ApiClient {
    /// 创建带超时的客户端
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        tracing::info!(timeout_secs = timeout.as_secs(), "API client initialized");
        Ok(Self::from_client(http))
    }

    /// 包装已有的 reqwest 客户端
    pub fn from_client(http: reqwest::Client) -> Self {
        Self {
            http,
            interceptor: RwLock::new(None),
        }
    }

    /// 安装拦截器,替换已有的
    pub async fn set_interceptor(&self, interceptor: Arc<dyn CallInterceptor>) {
        let mut slot = self.interceptor.write().await;
        if slot.is_some() {
            tracing::debug!("Replacing existing API call interceptor");
        }
        *slot = Some(interceptor);
    }

    /// 移除拦截器,恢复为未监控状态
    pub async fn clear_interceptor(&self) {
        self.interceptor.write().await.take();
    }

    pub async fn has_interceptor(&self) -> bool {
        self.interceptor.read().await.is_some()
    }

    /// 底层 reqwest 客户端,用于构造请求
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// 发送请求
    ///
    /// 从发出到完成计时,完成后通知拦截器。
    /// 返回值与直接调用 `reqwest::Client::execute` 完全一致。
    pub async fn send(&self, request: reqwest::Request) -> Result<reqwest::Response, reqwest::Error> {
        let url = request.url().to_string();
        let interceptor = self.interceptor.read().await.clone();

        let started = Instant::now();
        let result = self.http.execute(request).await;
        let duration_ms = started.elapsed().as_secs_f64() * 1000.0;

        if let Some(interceptor) = interceptor {
            match &result {
                Ok(response) => {
                    interceptor
                        .on_completed(&url, duration_ms, response.status().as_u16())
                        .await
                }
                Err(e) => interceptor.on_failed(&url, &e.to_string()).await,
            }
        }

        result
    }

    /// GET 请求
    pub async fn get(&self, url: &str) -> Result<reqwest::Response, reqwest::Error> {
        let request = self.http.get(url).build()?;
        self.send(request).await
    }

    /// 以JSON为请求体的 POST 请求
    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &T,
    ) -> Result<reqwest::Response, reqwest::Error> {
        let request = self.http.post(url).json(body).build()?;
        self.send(request).await
    }
}
