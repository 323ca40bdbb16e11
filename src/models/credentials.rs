//! 会话凭证模型
//!
//! 凭证 = 门户的 Cookie 集合 + 表单防伪令牌。
//! 凭证值本身是不可变快照，归 `CredentialStore` 独占管理。

use std::collections::BTreeMap;

use regex::Regex;

use crate::error::ConfigurationError;

/// 会话凭证快照
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// Cookie 名 → 值（键唯一，顺序无关）
    cookies: BTreeMap<String, String>,
    /// 表单防伪令牌（字段 __RequestVerificationToken）
    verification_token: String,
}

impl Credentials {
    pub fn new(cookies: BTreeMap<String, String>, verification_token: impl Into<String>) -> Self {
        Self {
            cookies,
            verification_token: verification_token.into(),
        }
    }

    pub fn cookies(&self) -> &BTreeMap<String, String> {
        &self.cookies
    }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.cookies.contains_key(name)
    }

    pub fn set_cookie(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.cookies.insert(name.into(), value.into());
    }

    pub fn verification_token(&self) -> &str {
        &self.verification_token
    }

    /// 渲染 Cookie 请求头的值
    pub fn cookie_header(&self) -> String {
        self.cookies
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// 是否足以发起一次认证请求
    pub fn is_complete(&self) -> bool {
        !self.cookies.is_empty() && !self.verification_token.is_empty()
    }
}

/// 从抓包的 curl 命令文本解析凭证
///
/// 接受浏览器"复制为 cURL"的输出：`-b` 参数携带 Cookie 行，
/// 表单数据里携带 `__RequestVerificationToken` 部件。
/// 令牌部件同时兼容 `$'...'` 转义形式（字面 `\r\n`）和真实 CRLF。
pub fn parse_capture(text: &str) -> Result<Credentials, ConfigurationError> {
    let cookie_re = Regex::new(r#"-b\s+['"]([^'"]+)['"]"#).expect("静态正则");
    let token_re = Regex::new(
        r#"name="__RequestVerificationToken"(?:\\r\\n\\r\\n|\r\n\r\n)([A-Za-z0-9_-]+)"#,
    )
    .expect("静态正则");

    let cookie_line = cookie_re
        .captures(text)
        .and_then(|caps| caps.get(1))
        .ok_or_else(|| {
            ConfigurationError::malformed_credentials("抓包文本中未找到 -b Cookie 参数")
        })?;

    let mut cookies = BTreeMap::new();
    for pair in cookie_line.as_str().split("; ") {
        if let Some((name, value)) = pair.split_once('=') {
            let name = name.trim();
            if !name.is_empty() {
                cookies.insert(name.to_string(), value.trim().to_string());
            }
        }
    }
    if cookies.is_empty() {
        return Err(ConfigurationError::malformed_credentials(
            "Cookie 行中没有任何 name=value 项",
        ));
    }

    let token = token_re
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| {
            ConfigurationError::malformed_credentials(
                "抓包文本中未找到 __RequestVerificationToken 部件",
            )
        })?;

    Ok(Credentials::new(cookies, token))
}
