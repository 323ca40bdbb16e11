//! 应用程序错误类型
//!
//! 错误分三类，处置策略各不相同：
//! - [`NetworkError`]：瞬态故障，仅编排层可决定有限重试
//! - [`ConfigurationError`]：致命错误，立即上报，永不重试
//! - [`RemoteRejection`]：服务器明确拒绝，附带判定详情记录上报

use thiserror::Error;

use crate::services::classifier::Verdict;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 网络错误（DNS / 连接 / TLS / 超时）
    #[error("网络错误: {0}")]
    Network(#[from] NetworkError),
    /// 配置错误（未知国籍、缺失字段、凭证不完整等）
    #[error("配置错误: {0}")]
    Config(#[from] ConfigurationError),
    /// 服务器拒绝了提交
    #[error("远端拒绝: {0}")]
    Remote(#[from] RemoteRejection),
}

impl AppError {
    /// 是否为可重试的瞬态错误
    pub fn is_transient(&self) -> bool {
        matches!(self, AppError::Network(_))
    }
}

/// 网络层错误
#[derive(Debug, Error)]
pub enum NetworkError {
    /// HTTP 客户端初始化失败
    #[error("HTTP 客户端初始化失败: {source}")]
    Client {
        #[source]
        source: reqwest::Error,
    },
    /// 连接或读取超时
    #[error("请求超时 ({url})")]
    Timeout {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// 连接失败（含 TLS 握手失败）
    #[error("连接失败 ({url}): {source}")]
    Connect {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// 其他请求失败
    #[error("请求失败 ({url}): {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl NetworkError {
    /// 按失败阶段归类 reqwest 错误
    pub fn from_reqwest(url: impl Into<String>, source: reqwest::Error) -> Self {
        let url = url.into();
        if source.is_timeout() {
            NetworkError::Timeout { url, source }
        } else if source.is_connect() {
            NetworkError::Connect { url, source }
        } else {
            NetworkError::Request { url, source }
        }
    }

    /// 连接阶段的失败可对幂等请求重试
    pub fn is_connect_phase(&self) -> bool {
        matches!(
            self,
            NetworkError::Timeout { .. } | NetworkError::Connect { .. }
        )
    }
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// 国籍不在映射表中
    #[error("未知国籍 '{name}'{suggestion}")]
    UnknownNationality { name: String, suggestion: String },
    /// 记录缺少必填字段
    #[error("缺少必填字段: {field}")]
    MissingField { field: &'static str },
    /// 凭证不完整或无法解析
    #[error("凭证不完整: {reason}")]
    MalformedCredentials { reason: String },
    /// 配置值无法解析
    #[error("配置值无效: {name} = '{value}'")]
    InvalidValue { name: String, value: String },
}

impl ConfigurationError {
    pub fn malformed_credentials(reason: impl Into<String>) -> Self {
        ConfigurationError::MalformedCredentials {
            reason: reason.into(),
        }
    }
}

/// 服务器拒绝
///
/// 非成功判定的结构化记录，由编排层上报给调用方
#[derive(Debug, Error)]
#[error("状态码 {status_code}, 判定 {verdict}: {detail}")]
pub struct RemoteRejection {
    pub status_code: u16,
    pub verdict: Verdict,
    pub detail: String,
}

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
