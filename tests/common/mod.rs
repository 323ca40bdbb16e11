//! 测试公用设施：脚本化的传输替身与测试数据构造
#![allow(dead_code)]

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use document_submit::{
    Config, CredentialStore, Credentials, DocumentRecord, NationalityTable, NetworkError,
    RawResponse, ResponseClassifier, SessionManager, SubmitProcessor, Transport, TransportRequest,
};

/// 按预置脚本应答的传输替身
pub struct MockTransport {
    script: Mutex<VecDeque<Result<RawResponse, NetworkError>>>,
    pub requests: Mutex<Vec<TransportRequest>>,
}

impl MockTransport {
    pub fn new(script: Vec<Result<RawResponse, NetworkError>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// 尚未消费的脚本条数
    pub fn remaining(&self) -> usize {
        self.script.lock().unwrap().len()
    }

    /// 已收到的请求数
    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: &TransportRequest) -> Result<RawResponse, NetworkError> {
        self.requests.lock().unwrap().push(request.clone());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .expect("脚本已耗尽，出现了多余的请求")
    }
}

pub fn response(status: u16, body: &str) -> RawResponse {
    RawResponse {
        status,
        set_cookies: Vec::new(),
        body: body.to_string(),
        elapsed: Duration::from_millis(10),
    }
}

pub fn response_with_cookies(status: u16, body: &str, set_cookies: &[&str]) -> RawResponse {
    RawResponse {
        set_cookies: set_cookies.iter().map(|s| s.to_string()).collect(),
        ..response(status, body)
    }
}

/// 借本机拒绝连接拿一个真实的网络错误
pub async fn network_error() -> NetworkError {
    let client = reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(1))
        .build()
        .expect("构建客户端失败");
    let err = client
        .get("http://127.0.0.1:9/")
        .send()
        .await
        .expect_err("本机 9 端口不应接受连接");
    NetworkError::from_reqwest("http://127.0.0.1:9/", err)
}

/// 完整凭证：两个 Cookie + 验证令牌
pub fn seeded_credentials() -> Credentials {
    let mut cookies = BTreeMap::new();
    cookies.insert("JSS".to_string(), "session-a".to_string());
    cookies.insert("ASP.NET_SessionId".to_string(), "sid-1".to_string());
    Credentials::new(cookies, "token-123")
}

/// 延迟与限速全部归零的测试配置
pub fn test_config() -> Config {
    Config {
        min_request_interval_ms: 0,
        batch_delay_ms: 0,
        submit_retry_delay_ms: 0,
        ..Config::default()
    }
}

/// 装配一个由替身传输驱动的提交处理器
pub fn test_processor(
    transport: Arc<MockTransport>,
    credentials: Credentials,
) -> (SubmitProcessor, Arc<CredentialStore>) {
    let store = Arc::new(CredentialStore::new(credentials));
    let dyn_transport: Arc<dyn Transport> = transport;
    let session = Arc::new(SessionManager::new(
        Arc::clone(&dyn_transport),
        Arc::clone(&store),
        "https://portal.example/TasheelWeb",
        Duration::ZERO,
    ));
    let processor = SubmitProcessor::new(
        dyn_transport,
        Arc::clone(&store),
        session,
        ResponseClassifier::default(),
        NationalityTable::builtin(),
        test_config(),
    );
    (processor, store)
}

pub fn test_record(passport_number: &str) -> DocumentRecord {
    DocumentRecord {
        passport_number: passport_number.to_string(),
        nationality: "india".to_string(),
        person_name: "TEST USER".to_string(),
        ..DocumentRecord::default()
    }
}
