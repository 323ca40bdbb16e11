//! 凭证仓库 - 业务能力层
//!
//! 全系统唯一的共享可变状态。所有写操作都在新快照上完成后整体替换，
//! 读取方拿到的 Arc 快照在整个请求期间保持一致，不会看到半更新状态。

use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::models::credentials::Credentials;

/// 允许新增的认证 Cookie 名前缀
///
/// 服务器轮换时只接收已登记的名字和这些前缀的新名字，其余丢弃
const AUTH_COOKIE_PREFIXES: [&str; 2] = ["__", ".AspNet"];

/// 凭证仓库
pub struct CredentialStore {
    inner: Mutex<Arc<Credentials>>,
}

impl CredentialStore {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            inner: Mutex::new(Arc::new(credentials)),
        }
    }

    /// 当前快照
    pub fn current(&self) -> Arc<Credentials> {
        Arc::clone(&self.lock())
    }

    /// 合并服务器轮换下来的 Cookie
    ///
    /// 已登记的名字更新值；认证前缀的新名字登记进来；其余丢弃。
    /// 返回实际应用的条数。
    pub fn merge(&self, updates: &[(String, String)]) -> usize {
        let mut guard = self.lock();
        let mut next = Credentials::clone(&guard);
        let mut applied = 0usize;

        for (name, value) in updates {
            if next.contains(name) {
                next.set_cookie(name.clone(), value.clone());
                applied += 1;
            } else if AUTH_COOKIE_PREFIXES
                .iter()
                .any(|prefix| name.starts_with(prefix))
            {
                debug!("登记新认证 Cookie: {}", name);
                next.set_cookie(name.clone(), value.clone());
                applied += 1;
            } else {
                debug!("丢弃无关 Cookie: {}", name);
            }
        }

        if applied > 0 {
            *guard = Arc::new(next);
        }
        applied
    }

    /// 整体替换快照（从外部抓包重新播种时使用）
    pub fn replace(&self, credentials: Credentials) {
        *self.lock() = Arc::new(credentials);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Arc<Credentials>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}
