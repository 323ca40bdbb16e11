//! # Document Submit
//!
//! 一个向有状态门户批量提交身份证件资料的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 传输层（Clients）
//! - `clients/` - 持有 HTTP 客户端，只暴露发送能力
//! - `PortalClient` - TLS 兼容模式、双超时、仅幂等请求的瞬态重试
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单次交换
//! - `CredentialStore` - 凭证快照的原子读写
//! - `form_encoder` - 逐字节精确的多部件表单编码
//! - `SessionManager` - 预热 / Cookie 轮换吸收 / 请求限速
//! - `ResponseClassifier` - (状态码, 响应体) → 结构化判定
//!
//! ### ③ 数据层（Models）
//! - `models/` - 凭证、表单字段、证件记录、国籍映射与加载器
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/submit_processor` - 单条提交的完整流程与重试决策
//! - `orchestrator/batch_processor` - 资源装配与严格串行的批量提交
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;

// 重新导出常用类型
pub use clients::{PortalClient, RawResponse, TlsMode, Transport, TransportConfig, TransportRequest};
pub use config::Config;
pub use error::{AppError, AppResult, ConfigurationError, NetworkError, RemoteRejection};
pub use models::{
    build_submission_fields, parse_capture, Attachment, Credentials, DocumentRecord, FormField,
    NationalityEntry, NationalityTable,
};
pub use orchestrator::{process_batch, App, BatchSummary, RetryPolicy, SubmissionResult, SubmitProcessor};
pub use services::{
    CredentialStore, ResponseClassifier, SessionExpiry, SessionManager, Verdict, WarmupReport,
};
