//! 单条提交处理器 - 编排层
//!
//! 一次提交按固定状态流转：构建 → 发送 → 吸收 Cookie → 判定。
//! 传输层失败直接短路为失败结果；是否重发由调用方的重试策略决定，
//! 且只对网络失败生效：会话失效判定对当前凭证是终态，
//! 用已知失效的凭证重发毫无意义。

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::clients::portal_client::{Transport, TransportRequest};
use crate::config::{self, Config};
use crate::error::{AppError, AppResult, ConfigurationError, RemoteRejection};
use crate::models::document::{build_submission_fields, DocumentRecord};
use crate::models::nationality::{NationalityEntry, NationalityTable};
use crate::services::classifier::{ResponseClassifier, Verdict};
use crate::services::credential_store::CredentialStore;
use crate::services::form_encoder;
use crate::services::session_service::SessionManager;
use crate::utils::logging::truncate_text;

/// 提交重试策略（由调用方显式指定，只作用于网络失败）
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub retry_delay: Duration,
}

impl RetryPolicy {
    /// 不重试
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            retry_delay: Duration::ZERO,
        }
    }
}

/// 单次提交的结果
///
/// 创建后不再修改，批量运行时逐条追加到结果日志
#[derive(Debug, Clone)]
pub struct SubmissionResult {
    pub passport_number: String,
    pub status_code: u16,
    /// 截断后的响应体，用于记录与人工复核
    pub body_preview: String,
    pub elapsed: Duration,
    pub verdict: Verdict,
    pub timestamp: DateTime<Utc>,
}

impl SubmissionResult {
    /// 非成功判定转为结构化拒绝记录
    pub fn rejection(&self) -> Option<RemoteRejection> {
        if self.verdict.is_success() {
            None
        } else {
            Some(RemoteRejection {
                status_code: self.status_code,
                verdict: self.verdict,
                detail: truncate_text(&self.body_preview, 200),
            })
        }
    }
}

/// 单条提交处理器
pub struct SubmitProcessor {
    transport: Arc<dyn Transport>,
    store: Arc<CredentialStore>,
    session: Arc<SessionManager>,
    classifier: ResponseClassifier,
    nationalities: NationalityTable,
    config: Config,
}

impl SubmitProcessor {
    pub fn new(
        transport: Arc<dyn Transport>,
        store: Arc<CredentialStore>,
        session: Arc<SessionManager>,
        classifier: ResponseClassifier,
        nationalities: NationalityTable,
        config: Config,
    ) -> Self {
        Self {
            transport,
            store,
            session,
            classifier,
            nationalities,
            config,
        }
    }

    /// 提交单条记录
    ///
    /// 配置错误立即上报，不重试；网络失败按策略重试，
    /// 每次重试都从最新凭证快照重新构建请求。
    pub async fn submit_one(
        &self,
        record: &DocumentRecord,
        retry: RetryPolicy,
    ) -> AppResult<SubmissionResult> {
        record.validate()?;
        let nationality = self.nationalities.lookup(&record.nationality)?.clone();

        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match self.submit_attempt(record, &nationality).await {
                Ok(result) => return Ok(result),
                Err(AppError::Network(e)) if attempt <= retry.max_retries => {
                    warn!(
                        "🔁 网络失败 ({})，{:?} 后重试 {}/{}",
                        e, retry.retry_delay, attempt, retry.max_retries
                    );
                    tokio::time::sleep(retry.retry_delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// 一次完整的请求/响应交换
    async fn submit_attempt(
        &self,
        record: &DocumentRecord,
        nationality: &NationalityEntry,
    ) -> AppResult<SubmissionResult> {
        // ========== 构建 ==========
        let creds = self.store.current();
        if !creds.is_complete() {
            return Err(ConfigurationError::malformed_credentials(
                "Cookie 集合或验证令牌为空，无法发起认证请求",
            )
            .into());
        }

        let fields = build_submission_fields(
            record,
            nationality,
            creds.verification_token(),
            &self.config.default_email,
            &self.config.default_contact_no,
        );
        let boundary = form_encoder::generate_boundary();
        let body = form_encoder::encode(&fields, &boundary);
        debug!("表单构建完成: {} 个字段, {} 字节", fields.len(), body.len());

        let request = TransportRequest::post(self.config.submit_url())
            .with_headers(&config::static_headers())
            .with_cookie_header(creds.cookie_header())
            .with_body(form_encoder::content_type(&boundary), body);

        // ========== 发送 ==========
        self.session.before_request().await;
        info!("📤 正在提交证件 (护照号: {})...", record.passport_number);
        let response = self.transport.send(&request).await?;

        // ========== 吸收轮换的 Cookie ==========
        self.session.observe(&response);

        // ========== 判定 ==========
        let verdict = self.classifier.classify(response.status, &response.body);
        self.log_verdict(record, &response.body, response.status, verdict);

        Ok(SubmissionResult {
            passport_number: record.passport_number.clone(),
            status_code: response.status,
            body_preview: truncate_text(&response.body, 1000),
            elapsed: response.elapsed,
            verdict,
            timestamp: Utc::now(),
        })
    }

    fn log_verdict(&self, record: &DocumentRecord, body: &str, status: u16, verdict: Verdict) {
        match verdict {
            Verdict::Success => {
                info!(
                    "🎉 提交成功! (护照号: {}, 状态码: {})",
                    record.passport_number, status
                );
            }
            Verdict::ReauthRequired => {
                warn!(
                    "❌ 会话失效 (护照号: {}, 状态码: {})，请更新凭证后再试",
                    record.passport_number, status
                );
            }
            Verdict::ValidationError => {
                warn!(
                    "⚠️ 数据未通过校验 (护照号: {}, 状态码: {})",
                    record.passport_number, status
                );
            }
            Verdict::ServerError => {
                warn!(
                    "⚠️ 服务器端错误 (护照号: {}, 状态码: {})",
                    record.passport_number, status
                );
            }
            Verdict::Unrecognized { .. } => {
                info!(
                    "🤔 无法识别的响应 (护照号: {}, 状态码: {})，需人工复核",
                    record.passport_number, status
                );
                if self.config.verbose_logging {
                    info!("响应预览: {}", truncate_text(body, 200));
                }
            }
        }
    }
}
