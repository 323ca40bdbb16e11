//! 会话管理器测试：限速、预热、Cookie 轮换、过期探测

mod common;

use std::sync::Arc;
use std::time::{Duration, Instant};

use document_submit::{
    CredentialStore, SessionExpiry, SessionManager, Transport,
};

use common::{network_error, response, response_with_cookies, seeded_credentials, MockTransport};

fn session_with(
    transport: Arc<MockTransport>,
    min_interval: Duration,
) -> (SessionManager, Arc<CredentialStore>) {
    let store = Arc::new(CredentialStore::new(seeded_credentials()));
    let dyn_transport: Arc<dyn Transport> = transport;
    let session = SessionManager::new(
        dyn_transport,
        Arc::clone(&store),
        "https://portal.example/TasheelWeb",
        min_interval,
    );
    (session, store)
}

#[tokio::test]
async fn test_rate_limiter_enforces_min_interval() {
    let transport = MockTransport::new(vec![]);
    let (session, _store) = session_with(transport, Duration::from_millis(150));

    let start = Instant::now();
    session.before_request().await;
    session.before_request().await;
    let elapsed = start.elapsed();

    assert!(
        elapsed >= Duration::from_millis(150),
        "第二次调用必须等满最小间隔，实际 {:?}",
        elapsed
    );
}

#[tokio::test]
async fn test_rate_limiter_no_wait_after_interval_elapsed() {
    let transport = MockTransport::new(vec![]);
    let (session, _store) = session_with(transport, Duration::from_millis(50));

    session.before_request().await;
    tokio::time::sleep(Duration::from_millis(80)).await;

    let before = Instant::now();
    session.before_request().await;
    assert!(
        before.elapsed() < Duration::from_millis(40),
        "间隔已满时不应再等待"
    );
}

#[tokio::test]
async fn test_warmup_reports_per_endpoint_status() {
    // 三个端点：认证有效 / 登录页 / 网络失败
    let transport = MockTransport::new(vec![
        Ok(response(200, "{\"token\":\"ed-123\"}")),
        Ok(response(200, "<html>Please login</html>")),
        Err(network_error().await),
    ]);
    let (session, _store) = session_with(transport.clone(), Duration::ZERO);

    let report = session.warmup().await;

    assert_eq!(report.endpoints_checked, 3);
    assert_eq!(report.endpoints_authenticated, 1);
    assert!(report.session_valid());

    assert!(report.endpoints[0].authenticated);
    assert_eq!(report.endpoints[0].status_code, Some(200));
    assert!(!report.endpoints[1].authenticated);
    assert!(!report.endpoints[2].authenticated);
    assert_eq!(report.endpoints[2].status_code, None);

    // 预热请求携带当前凭证与固定浏览器头
    let requests = transport.requests.lock().unwrap();
    assert_eq!(requests.len(), 3);
    assert_eq!(requests[0].method, reqwest::Method::POST);
    assert_eq!(requests[1].method, reqwest::Method::GET);
    assert!(requests[0].cookie_header.contains("JSS=session-a"));
    assert!(requests[1].url.contains("usertransactionscount?_="));
    assert!(requests[2].url.contains("common/FetchFavourites?_="));
}

#[tokio::test]
async fn test_warmup_empty_body_not_authenticated() {
    let transport = MockTransport::new(vec![
        Ok(response(200, "")),
        Ok(response(403, "forbidden")),
        Ok(response(200, "ok")),
    ]);
    let (session, _store) = session_with(transport, Duration::ZERO);

    let report = session.warmup().await;
    assert_eq!(report.endpoints_authenticated, 1, "空响应体不算认证有效");
}

#[tokio::test]
async fn test_observe_merges_rotated_cookies() {
    let transport = MockTransport::new(vec![]);
    let (session, store) = session_with(transport, Duration::ZERO);

    let resp = response_with_cookies(
        200,
        "ok",
        &[
            "JSS=rotated; Path=/; HttpOnly",
            "__NewAuth=abc; Secure",
            "garbage-without-equals",
            "AdTracker=zzz",
        ],
    );
    session.observe(&resp);

    let current = store.current();
    assert_eq!(current.cookie("JSS"), Some("rotated"));
    assert_eq!(current.cookie("__NewAuth"), Some("abc"));
    assert_eq!(current.cookie("AdTracker"), None);
}

#[tokio::test]
async fn test_check_session_expiry_minutes() {
    let transport = MockTransport::new(vec![Ok(response(200, "45"))]);
    let (session, _store) = session_with(transport, Duration::ZERO);

    let expiry = session.check_session_expiry().await.expect("探测应成功");
    assert_eq!(expiry, SessionExpiry::Valid { minutes: 45 });
}

#[tokio::test]
async fn test_check_session_expiry_zero_is_expired() {
    let transport = MockTransport::new(vec![Ok(response(200, "0"))]);
    let (session, _store) = session_with(transport, Duration::ZERO);

    let expiry = session.check_session_expiry().await.expect("探测应成功");
    assert_eq!(expiry, SessionExpiry::Expired);
}

#[tokio::test]
async fn test_check_session_expiry_login_page_is_expired() {
    let transport = MockTransport::new(vec![Ok(response(200, "<html>Login</html>"))]);
    let (session, _store) = session_with(transport, Duration::ZERO);

    let expiry = session.check_session_expiry().await.expect("探测应成功");
    assert_eq!(expiry, SessionExpiry::Expired);
}

#[tokio::test]
async fn test_check_session_expiry_unknown_response() {
    let transport = MockTransport::new(vec![Ok(response(200, "<html>maintenance</html>"))]);
    let (session, _store) = session_with(transport, Duration::ZERO);

    let expiry = session.check_session_expiry().await.expect("探测应成功");
    assert_eq!(expiry, SessionExpiry::Unknown);
}
