//! 批量提交处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责资源装配和批量提交。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：播种凭证、构建传输层、装配会话管理器
//! 2. **批量加载**：递归扫描资料目录（`Vec<DocumentRecord>`）
//! 3. **严格串行**：同一凭证下绝不并发请求，条目之间固定延迟
//! 4. **逐条结果**：单条失败不中断批次，每条记录都有结果
//! 5. **全局统计**：汇总成功/失败并写出结果日志

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use crate::clients::portal_client::{PortalClient, TlsMode, Transport, TransportConfig};
use crate::config::Config;
use crate::error::AppResult;
use crate::models::credentials::{parse_capture, Credentials};
use crate::models::document::DocumentRecord;
use crate::models::loaders::load_all_documents;
use crate::models::nationality::NationalityTable;
use crate::services::classifier::ResponseClassifier;
use crate::services::credential_store::CredentialStore;
use crate::services::session_service::{SessionExpiry, SessionManager};
use crate::orchestrator::submit_processor::{RetryPolicy, SubmissionResult, SubmitProcessor};

/// 应用主结构
pub struct App {
    config: Config,
    session: Arc<SessionManager>,
    processor: SubmitProcessor,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        log_startup(&config);

        // 播种凭证
        let credentials = match tokio::fs::read_to_string(&config.capture_file).await {
            Ok(text) => {
                let creds = parse_capture(&text).with_context(|| {
                    format!("无法从抓包文件解析凭证: {}", config.capture_file)
                })?;
                info!(
                    "✓ 从 {} 加载了 {} 个 Cookie 和验证令牌",
                    config.capture_file,
                    creds.cookies().len()
                );
                creds
            }
            Err(_) => {
                warn!(
                    "⚠️ 未找到抓包文件 {}，凭证为空，提交将被拒绝，请先提供凭证",
                    config.capture_file
                );
                Credentials::default()
            }
        };
        let store = Arc::new(CredentialStore::new(credentials));

        // 传输层
        let transport_config = TransportConfig {
            tls_mode: if config.tls_relaxed {
                TlsMode::Relaxed
            } else {
                TlsMode::Strict
            },
            connect_timeout: Duration::from_secs(config.connect_timeout_secs),
            read_timeout: Duration::from_secs(config.read_timeout_secs),
            ..TransportConfig::default()
        };
        let transport: Arc<dyn Transport> =
            Arc::new(PortalClient::new(transport_config).context("传输层初始化失败")?);

        // 会话管理器
        let session = Arc::new(SessionManager::new(
            Arc::clone(&transport),
            Arc::clone(&store),
            config.portal_base_url.clone(),
            Duration::from_millis(config.min_request_interval_ms),
        ));

        // 国籍映射表
        let nationalities = NationalityTable::load(&config.nationality_csv);
        info!("✓ 国籍映射表共 {} 条", nationalities.len());

        let processor = SubmitProcessor::new(
            transport,
            store,
            Arc::clone(&session),
            ResponseClassifier::default(),
            nationalities,
            config.clone(),
        );

        Ok(Self {
            config,
            session,
            processor,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<BatchSummary> {
        // 加载所有待提交的证件资料
        info!("\n📁 正在扫描待提交的证件资料...");
        let records = load_all_documents(&self.config.documents_folder).await?;

        if records.is_empty() {
            warn!("⚠️ 没有找到待提交的证件资料，程序结束");
            return Ok(BatchSummary::default());
        }
        info!("✓ 找到 {} 条待提交记录", records.len());

        // 会话预热
        if self.config.warmup_before_submit {
            match self.session.check_session_expiry().await {
                Ok(SessionExpiry::Valid { minutes }) => info!("会话剩余 {} 分钟", minutes),
                Ok(SessionExpiry::Expired) => {
                    warn!("⚠️ 会话已过期，提交大概率会被拒绝")
                }
                Ok(SessionExpiry::Unknown) => {}
                Err(e) => warn!("会话探测失败: {}", e),
            }
            let report = self.session.warmup().await;
            if !report.session_valid() {
                warn!("⚠️ 预热未确认认证状态，继续提交但可能失败");
            }
        }

        // 批量提交
        let retry = RetryPolicy {
            max_retries: self.config.submit_retries,
            retry_delay: Duration::from_millis(self.config.submit_retry_delay_ms),
        };
        let summary = process_batch(
            &self.processor,
            &records,
            retry,
            Duration::from_millis(self.config.batch_delay_ms),
        )
        .await;

        // 写出结果日志
        write_result_log(&self.config.result_log_file, &summary)
            .with_context(|| format!("无法写出结果日志: {}", self.config.result_log_file))?;

        print_final_stats(&summary, &self.config);
        Ok(summary)
    }
}

/// 单条记录的批次结果
#[derive(Debug)]
pub struct ItemReport {
    pub index: usize,
    pub passport_number: String,
    pub outcome: AppResult<SubmissionResult>,
}

/// 批量结果汇总
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub total: usize,
    pub success: usize,
    pub failed: usize,
    pub items: Vec<ItemReport>,
}

/// 严格串行地提交记录序列
///
/// 每条记录独立成败，批次永远跑完；条目之间插入固定延迟
pub async fn process_batch(
    processor: &SubmitProcessor,
    records: &[DocumentRecord],
    retry: RetryPolicy,
    delay: Duration,
) -> BatchSummary {
    let total = records.len();
    log_batch_start(total);

    let mut items = Vec::with_capacity(total);
    let mut success = 0usize;

    for (idx, record) in records.iter().enumerate() {
        let index = idx + 1;
        info!("\n[{}/{}] 正在处理 {}...", index, total, record.passport_number);

        let outcome = processor.submit_one(record, retry).await;
        match &outcome {
            Ok(result) if result.verdict.is_success() => {
                success += 1;
            }
            Ok(result) => {
                if let Some(rejection) = result.rejection() {
                    warn!("[{}/{}] 远端拒绝: {}", index, total, rejection);
                }
            }
            Err(e) => {
                error!("[{}/{}] ❌ 提交失败: {}", index, total, e);
            }
        }

        items.push(ItemReport {
            index,
            passport_number: record.passport_number.clone(),
            outcome,
        });

        if index < total {
            tokio::time::sleep(delay).await;
        }
    }

    BatchSummary {
        total,
        success,
        failed: total - success,
        items,
    }
}

/// 把批次结果写成 JSON 文件
fn write_result_log(path: &str, summary: &BatchSummary) -> Result<()> {
    let items: Vec<serde_json::Value> = summary
        .items
        .iter()
        .map(|item| match &item.outcome {
            Ok(result) => serde_json::json!({
                "index": item.index,
                "passport_number": item.passport_number,
                "success": result.verdict.is_success(),
                "verdict": result.verdict.to_string(),
                "status_code": result.status_code,
                "elapsed_secs": result.elapsed.as_secs_f64(),
                "timestamp": result.timestamp.to_rfc3339(),
                "response_preview": result.body_preview,
            }),
            Err(e) => serde_json::json!({
                "index": item.index,
                "passport_number": item.passport_number,
                "success": false,
                "error": e.to_string(),
            }),
        })
        .collect();

    let log = serde_json::json!({
        "completed_at": chrono::Local::now().to_rfc3339(),
        "total": summary.total,
        "success": summary.success,
        "failed": summary.failed,
        "results": items,
    });
    std::fs::write(path, serde_json::to_string_pretty(&log)?)?;
    Ok(())
}

// ========== 日志辅助函数 ==========

fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 证件批量提交模式");
    info!("🌐 门户地址: {}", config.portal_base_url);
    info!(
        "⏱️ 限速间隔: {}ms, 批次延迟: {}ms",
        config.min_request_interval_ms, config.batch_delay_ms
    );
    info!("{}", "=".repeat(60));
}

fn log_batch_start(total: usize) {
    info!("\n{}", "=".repeat(60));
    info!("📦 开始批量提交: 共 {} 条记录", total);
    info!("💡 严格串行处理，单条失败不影响其余记录");
    info!("{}", "=".repeat(60));
}

fn print_final_stats(summary: &BatchSummary, config: &Config) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部提交完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", summary.success, summary.total);
    info!("❌ 失败: {}", summary.failed);
    info!("{}", "=".repeat(60));
    info!("\n结果已保存至: {}", config.result_log_file);
}
