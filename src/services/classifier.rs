//! 响应分类器 - 业务能力层
//!
//! 把一次交换的 (状态码, 响应体) 纯函数地映射为结构化判定。
//! 关键字列表是启发式的，没命中任何规则的响应一律判为
//! [`Verdict::Unrecognized`]，留给人工复核，不强行猜测。

use std::fmt;

/// 一次提交交换的判定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// 服务器确认收到
    Success,
    /// 会话失效，需要重新获取凭证
    ReauthRequired,
    /// 提交数据未通过校验
    ValidationError,
    /// 服务器端错误
    ServerError,
    /// 无法识别的响应，需要人工复核
    Unrecognized { status_code: u16 },
}

impl Verdict {
    pub fn is_success(&self) -> bool {
        matches!(self, Verdict::Success)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Success => write!(f, "SUCCESS"),
            Verdict::ReauthRequired => write!(f, "REAUTH_REQUIRED"),
            Verdict::ValidationError => write!(f, "VALIDATION_ERROR"),
            Verdict::ServerError => write!(f, "SERVER_ERROR"),
            Verdict::Unrecognized { status_code } => write!(f, "UNRECOGNIZED_{}", status_code),
        }
    }
}

/// 响应分类器
#[derive(Debug, Clone)]
pub struct ResponseClassifier {
    login_markers: Vec<String>,
    success_keywords: Vec<String>,
    error_keywords: Vec<String>,
}

impl Default for ResponseClassifier {
    fn default() -> Self {
        Self::new(
            ["login", "تسجيل الدخول"],
            ["success", "submitted", "confirmed", "received"],
            ["error", "invalid"],
        )
    }
}

impl ResponseClassifier {
    pub fn new<L, S, E>(login_markers: L, success_keywords: S, error_keywords: E) -> Self
    where
        L: IntoIterator,
        L::Item: Into<String>,
        S: IntoIterator,
        S::Item: Into<String>,
        E: IntoIterator,
        E::Item: Into<String>,
    {
        let normalize = |items: Vec<String>| -> Vec<String> {
            items.into_iter().map(|s| s.to_lowercase()).collect()
        };
        Self {
            login_markers: normalize(login_markers.into_iter().map(Into::into).collect()),
            success_keywords: normalize(success_keywords.into_iter().map(Into::into).collect()),
            error_keywords: normalize(error_keywords.into_iter().map(Into::into).collect()),
        }
    }

    /// 分类一次交换，规则按序匹配，首个命中生效
    ///
    /// 登录页判定必须先于成功关键字：登录页可能恰好包含无关的成功字样。
    pub fn classify(&self, status_code: u16, body: &str) -> Verdict {
        if status_code != 200 {
            return match status_code {
                401 | 403 => Verdict::ReauthRequired,
                404 => Verdict::Unrecognized { status_code },
                s if s >= 500 => Verdict::ServerError,
                _ => Verdict::Unrecognized { status_code },
            };
        }

        let body = body.to_lowercase();
        if self.login_markers.iter().any(|m| body.contains(m)) {
            Verdict::ReauthRequired
        } else if self.success_keywords.iter().any(|k| body.contains(k)) {
            Verdict::Success
        } else if self.error_keywords.iter().any(|k| body.contains(k)) {
            Verdict::ValidationError
        } else {
            Verdict::Unrecognized { status_code: 200 }
        }
    }
}
