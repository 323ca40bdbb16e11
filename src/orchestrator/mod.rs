//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责把各业务能力组合成完整的提交流程，是唯一有权决定重试的地方。
//!
//! ### `submit_processor` - 单条提交处理器
//! - 一次提交的完整状态流转：构建 → 发送 → 吸收 Cookie → 判定
//! - 网络失败按调用方给定的策略有限重试
//! - 会话失效判定对当前凭证是终态，绝不原样重发
//!
//! ### `batch_processor` - 批量提交处理器
//! - 管理应用生命周期（凭证播种、传输层、会话管理器）
//! - 严格串行地处理记录序列，条目之间插入固定延迟
//! - 每条记录一个结果，单条失败不中断批次
//! - 汇总统计并写出结果日志
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<DocumentRecord>)
//!     ↓
//! submit_processor (处理单条 DocumentRecord)
//!     ↓
//! services (能力层：encoder / session / classifier / credential_store)
//!     ↓
//! clients (传输层：PortalClient)
//! ```

pub mod batch_processor;
pub mod submit_processor;

pub use batch_processor::{process_batch, App, BatchSummary, ItemReport};
pub use submit_processor::{RetryPolicy, SubmissionResult, SubmitProcessor};
