//! 门户 HTTP 传输层
//!
//! 封装 reqwest 客户端：TLS 兼容模式、连接/读取双超时、
//! 仅限幂等请求的瞬态重试。提交（POST）永远不在这一层重试，
//! 重发与否是编排层的显式决策。

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use reqwest::Method;
use tracing::{debug, info, warn};

use crate::error::NetworkError;

/// 瞬态状态码：幂等请求遇到时按退避策略重试
const TRANSIENT_STATUS: [u16; 5] = [429, 500, 502, 503, 504];

/// TLS 兼容模式
///
/// 门户部分节点无法完成严格握手，宽松模式在构造时一次性选定，
/// 构造后不可变，也绝不在请求中途静默降级。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlsMode {
    /// 严格证书与密码套件校验
    Strict,
    /// 放宽证书校验与最低 TLS 版本
    Relaxed,
}

/// 传输层配置
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls_mode: TlsMode,
    /// 连接超时（短）
    pub connect_timeout: Duration,
    /// 整体读取超时（长，门户处理证件很慢）
    pub read_timeout: Duration,
    /// 幂等请求的瞬态重试次数
    pub max_retries: u32,
    /// 指数退避基数
    pub backoff_base: Duration,
    /// 退避上限
    pub backoff_cap: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls_mode: TlsMode::Strict,
            connect_timeout: Duration::from_secs(10),
            read_timeout: Duration::from_secs(120),
            max_retries: 3,
            backoff_base: Duration::from_secs(1),
            backoff_cap: Duration::from_secs(30),
        }
    }
}

/// 传输层请求
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub cookie_header: String,
    pub content_type: Option<String>,
    pub body: Option<Vec<u8>>,
}

impl TransportRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            cookie_header: String::new(),
            content_type: None,
            body: None,
        }
    }

    pub fn with_headers(mut self, headers: &[(&str, &str)]) -> Self {
        self.headers.extend(
            headers
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_string())),
        );
        self
    }

    pub fn with_cookie_header(mut self, cookie_header: impl Into<String>) -> Self {
        self.cookie_header = cookie_header.into();
        self
    }

    pub fn with_body(mut self, content_type: impl Into<String>, body: Vec<u8>) -> Self {
        self.content_type = Some(content_type.into());
        self.body = Some(body);
        self
    }
}

/// 原始 HTTP 响应
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    /// 原样保留的 Set-Cookie 头，交给会话管理器解析
    pub set_cookies: Vec<String>,
    pub body: String,
    pub elapsed: Duration,
}

/// 传输层接口
///
/// 编排层和会话管理器只依赖这个接口，测试中可注入替身传输
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &TransportRequest) -> Result<RawResponse, NetworkError>;
}

/// 门户 HTTP 客户端
pub struct PortalClient {
    client: reqwest::Client,
    config: TransportConfig,
}

impl PortalClient {
    /// 创建客户端，TLS 模式在此一次性选定
    pub fn new(config: TransportConfig) -> Result<Self, NetworkError> {
        let mut builder = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.read_timeout);

        match config.tls_mode {
            TlsMode::Strict => {
                info!("传输层: 严格 TLS 模式");
            }
            TlsMode::Relaxed => {
                warn!("传输层: 宽松 TLS 模式（放宽证书校验与最低 TLS 版本）");
                builder = builder
                    .danger_accept_invalid_certs(true)
                    .danger_accept_invalid_hostnames(true)
                    .min_tls_version(reqwest::tls::Version::TLS_1_0);
            }
        }

        let client = builder
            .build()
            .map_err(|source| NetworkError::Client { source })?;
        Ok(Self { client, config })
    }

    async fn dispatch(&self, request: &TransportRequest) -> Result<RawResponse, NetworkError> {
        let started = Instant::now();

        let mut builder = self
            .client
            .request(request.method.clone(), &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !request.cookie_header.is_empty() {
            builder = builder.header(COOKIE, request.cookie_header.as_str());
        }
        if let Some(content_type) = &request.content_type {
            builder = builder.header(CONTENT_TYPE, content_type.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| NetworkError::from_reqwest(&request.url, e))?;

        let status = response.status().as_u16();
        let set_cookies = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok().map(str::to_string))
            .collect();
        let body = response
            .text()
            .await
            .map_err(|e| NetworkError::from_reqwest(&request.url, e))?;

        Ok(RawResponse {
            status,
            set_cookies,
            body,
            elapsed: started.elapsed(),
        })
    }

    /// 第 attempt 次失败后的退避时长（指数增长，封顶）
    fn backoff(&self, attempt: u32) -> Duration {
        let shift = attempt.saturating_sub(1).min(16);
        let delay = self.config.backoff_base.saturating_mul(1 << shift);
        delay.min(self.config.backoff_cap)
    }
}

#[async_trait]
impl Transport for PortalClient {
    async fn send(&self, request: &TransportRequest) -> Result<RawResponse, NetworkError> {
        let idempotent = request.method == Method::GET || request.method == Method::HEAD;
        let max_attempts = if idempotent {
            self.config.max_retries + 1
        } else {
            1
        };

        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match self.dispatch(request).await {
                Ok(response) => {
                    if attempt < max_attempts && TRANSIENT_STATUS.contains(&response.status) {
                        let delay = self.backoff(attempt);
                        debug!(
                            "瞬态状态码 {} ({})，{:?} 后重试 {}/{}",
                            response.status,
                            request.url,
                            delay,
                            attempt,
                            max_attempts - 1
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    return Ok(response);
                }
                Err(e) => {
                    if attempt < max_attempts && e.is_connect_phase() {
                        let delay = self.backoff(attempt);
                        debug!("{}，{:?} 后重试 {}/{}", e, delay, attempt, max_attempts - 1);
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    return Err(e);
                }
            }
        }
    }
}
