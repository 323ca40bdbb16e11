//! 会话管理器 - 业务能力层
//!
//! 负责会话生命周期的三件事：
//! 1. 预热：登录后门户期望立刻被访问的一组无副作用端点
//! 2. 吸收服务器轮换下来的 Cookie，转交凭证仓库
//! 3. 请求限速：同一编排实例的所有请求（预热和提交一视同仁）
//!    之间保持最小间隔

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use reqwest::Method;
use tracing::{debug, info, warn};

use crate::clients::portal_client::{RawResponse, Transport, TransportRequest};
use crate::config;
use crate::error::NetworkError;
use crate::services::credential_store::CredentialStore;
use crate::utils::logging::truncate_text;

/// 预热端点：登录成功后浏览器会立刻访问的无副作用调用
struct WarmupEndpoint {
    name: &'static str,
    method: Method,
    path: &'static str,
    /// GET 端点带毫秒时间戳防缓存参数
    cache_buster: bool,
}

const WARMUP_ENDPOINTS: [WarmupEndpoint; 3] = [
    WarmupEndpoint {
        name: "eDirham 会话令牌",
        method: Method::POST,
        path: "GetEDirhamSessionToken",
        cache_buster: false,
    },
    WarmupEndpoint {
        name: "用户交易计数",
        method: Method::GET,
        path: "usertransactionscount",
        cache_buster: true,
    },
    WarmupEndpoint {
        name: "收藏列表",
        method: Method::GET,
        path: "common/FetchFavourites",
        cache_buster: true,
    },
];

/// 预热报告
#[derive(Debug, Clone)]
pub struct WarmupReport {
    pub endpoints_checked: usize,
    pub endpoints_authenticated: usize,
    pub endpoints: Vec<EndpointStatus>,
}

impl WarmupReport {
    /// 只要有一个端点以认证身份应答，会话就视为有效
    pub fn session_valid(&self) -> bool {
        self.endpoints_authenticated > 0
    }
}

/// 单个预热端点的结果
#[derive(Debug, Clone)]
pub struct EndpointStatus {
    pub name: &'static str,
    pub status_code: Option<u16>,
    pub authenticated: bool,
}

/// 会话过期探测结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionExpiry {
    /// 会话有效，剩余分钟数
    Valid { minutes: u32 },
    /// 会话已过期
    Expired,
    /// 无法解读的应答
    Unknown,
}

/// 会话管理器
pub struct SessionManager {
    transport: Arc<dyn Transport>,
    store: Arc<CredentialStore>,
    base_url: String,
    min_interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl SessionManager {
    pub fn new(
        transport: Arc<dyn Transport>,
        store: Arc<CredentialStore>,
        base_url: impl Into<String>,
        min_interval: Duration,
    ) -> Self {
        Self {
            transport,
            store,
            base_url: base_url.into(),
            min_interval,
            last_request: Mutex::new(None),
        }
    }

    /// 请求限速：距上次请求不足最小间隔时，协作式等待补足
    pub async fn before_request(&self) {
        let wait = {
            let guard = self.lock_last();
            guard.and_then(|last| self.min_interval.checked_sub(last.elapsed()))
        };
        if let Some(delay) = wait {
            debug!("限速: 等待 {:?}", delay);
            tokio::time::sleep(delay).await;
        }
        *self.lock_last() = Some(Instant::now());
    }

    /// 吸收响应中轮换的 Cookie
    ///
    /// 无法解析的 Set-Cookie 只记日志跳过，绝不让一次成功的交换因此失败
    pub fn observe(&self, response: &RawResponse) {
        if response.set_cookies.is_empty() {
            return;
        }
        let mut updates = Vec::new();
        for raw in &response.set_cookies {
            match parse_set_cookie(raw) {
                Some(pair) => updates.push(pair),
                None => debug!("忽略无法解析的 Set-Cookie: {}", truncate_text(raw, 40)),
            }
        }
        let applied = self.store.merge(&updates);
        if applied > 0 {
            info!("🔄 服务器轮换了 {} 个 Cookie，已更新凭证", applied);
        }
    }

    /// 会话预热
    ///
    /// 逐个访问固定端点序列；端点以认证身份应答 = HTTP 200 且响应体
    /// 非空且不含登录/未授权标记。单个端点失败不中断序列。
    pub async fn warmup(&self) -> WarmupReport {
        info!("🔥 正在预热会话 ({} 个端点)...", WARMUP_ENDPOINTS.len());

        let mut endpoints = Vec::new();
        for endpoint in &WARMUP_ENDPOINTS {
            self.before_request().await;

            let request = self.build_request(endpoint);
            match self.transport.send(&request).await {
                Ok(response) => {
                    self.observe(&response);
                    let authenticated = is_authenticated(&response);
                    if authenticated {
                        info!("✅ {}: 认证有效 ({})", endpoint.name, response.status);
                    } else {
                        warn!("❌ {}: 需要重新认证 ({})", endpoint.name, response.status);
                    }
                    endpoints.push(EndpointStatus {
                        name: endpoint.name,
                        status_code: Some(response.status),
                        authenticated,
                    });
                }
                Err(e) => {
                    warn!("❌ {}: {}", endpoint.name, e);
                    endpoints.push(EndpointStatus {
                        name: endpoint.name,
                        status_code: None,
                        authenticated: false,
                    });
                }
            }
        }

        let endpoints_authenticated = endpoints.iter().filter(|e| e.authenticated).count();
        info!(
            "预热完成: {}/{} 个端点认证有效",
            endpoints_authenticated,
            endpoints.len()
        );
        WarmupReport {
            endpoints_checked: endpoints.len(),
            endpoints_authenticated,
            endpoints,
        }
    }

    /// 探测会话剩余时间
    ///
    /// 门户返回纯数字（剩余分钟数）；返回登录页说明会话已过期
    pub async fn check_session_expiry(&self) -> Result<SessionExpiry, NetworkError> {
        self.before_request().await;

        let creds = self.store.current();
        let request = TransportRequest::post(self.endpoint_url("GetSessionExpirytime", false))
            .with_headers(&config::static_headers())
            .with_cookie_header(creds.cookie_header());
        let response = self.transport.send(&request).await?;
        self.observe(&response);

        let text = response.body.trim();
        let expiry = if let Ok(minutes) = text.parse::<u32>() {
            if minutes > 0 {
                SessionExpiry::Valid { minutes }
            } else {
                SessionExpiry::Expired
            }
        } else if text.to_lowercase().contains("login") {
            SessionExpiry::Expired
        } else {
            warn!("无法解读的会话过期应答: {}", truncate_text(text, 80));
            SessionExpiry::Unknown
        };
        Ok(expiry)
    }

    fn build_request(&self, endpoint: &WarmupEndpoint) -> TransportRequest {
        let creds = self.store.current();
        let url = self.endpoint_url(endpoint.path, endpoint.cache_buster);
        let mut request = if endpoint.method == Method::POST {
            // 空体 POST，让客户端带上 Content-Length: 0
            let mut r = TransportRequest::post(url);
            r.body = Some(Vec::new());
            r
        } else {
            TransportRequest::get(url)
        };
        request = request
            .with_headers(&config::static_headers())
            .with_cookie_header(creds.cookie_header());
        request
    }

    fn endpoint_url(&self, path: &str, cache_buster: bool) -> String {
        let base = format!("{}/{}", self.base_url.trim_end_matches('/'), path);
        if cache_buster {
            format!("{}?_={}", base, chrono::Utc::now().timestamp_millis())
        } else {
            base
        }
    }

    fn lock_last(&self) -> std::sync::MutexGuard<'_, Option<Instant>> {
        self.last_request.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// 认证有效 = 200 且响应体非空且不含登录/未授权标记
fn is_authenticated(response: &RawResponse) -> bool {
    if response.status != 200 || response.body.is_empty() {
        return false;
    }
    let lower = response.body.to_lowercase();
    !lower.contains("login") && !lower.contains("unauthorized")
}

/// 从 Set-Cookie 头取出 name=value（第一个分号之前）
fn parse_set_cookie(raw: &str) -> Option<(String, String)> {
    let first = raw.split(';').next()?;
    let (name, value) = first.split_once('=')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some((name.to_string(), value.trim().to_string()))
}
