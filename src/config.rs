use serde::Deserialize;
use tracing::warn;

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 门户根地址
    pub portal_base_url: String,
    /// 提交接口路径（相对门户根地址）
    pub submit_path: String,
    /// 证件资料存放目录（递归扫描 info.json）
    pub documents_folder: String,
    /// 凭证抓包文件路径（浏览器复制的 curl 命令文本）
    pub capture_file: String,
    /// 国籍映射 CSV 文件路径
    pub nationality_csv: String,
    /// 提交结果输出文件
    pub result_log_file: String,
    /// 连接超时（秒）
    pub connect_timeout_secs: u64,
    /// 读取超时（秒），门户处理证件较慢，需远大于连接超时
    pub read_timeout_secs: u64,
    /// 两次请求之间的最小间隔（毫秒）
    pub min_request_interval_ms: u64,
    /// 批量提交时每条记录之间的延迟（毫秒）
    pub batch_delay_ms: u64,
    /// 网络失败时的提交重试次数
    pub submit_retries: u32,
    /// 提交重试之间的固定延迟（毫秒）
    pub submit_retry_delay_ms: u64,
    /// 是否使用宽松 TLS 模式（门户部分节点无法完成严格握手）
    pub tls_relaxed: bool,
    /// 提交前是否执行会话预热
    pub warmup_before_submit: bool,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 记录未提供邮箱时的默认值
    pub default_email: String,
    /// 记录未提供联系电话时的默认值
    pub default_contact_no: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            portal_base_url: "https://eservices.mohre.gov.ae/TasheelWeb".to_string(),
            submit_path: "services/transactionentry/505?mk=".to_string(),
            documents_folder: "documents".to_string(),
            capture_file: "capture.txt".to_string(),
            nationality_csv: "country_mapping.csv".to_string(),
            result_log_file: "submission_results.json".to_string(),
            connect_timeout_secs: 10,
            read_timeout_secs: 120,
            min_request_interval_ms: 2000,
            batch_delay_ms: 2000,
            submit_retries: 2,
            submit_retry_delay_ms: 5000,
            tls_relaxed: true,
            warmup_before_submit: true,
            verbose_logging: false,
            default_email: "gomaa123456789268@gmail.com".to_string(),
            default_contact_no: "0505544143".to_string(),
        }
    }
}

impl Config {
    /// 加载配置：可选的 config.toml，再叠加环境变量覆盖
    pub fn load() -> Self {
        let base = match std::fs::read_to_string("config.toml") {
            Ok(text) => match toml::from_str::<Config>(&text) {
                Ok(config) => config,
                Err(e) => {
                    warn!("⚠️ config.toml 解析失败，使用默认配置: {}", e);
                    Config::default()
                }
            },
            Err(_) => Config::default(),
        };
        base.apply_env()
    }

    pub fn from_env() -> Self {
        Config::default().apply_env()
    }

    fn apply_env(self) -> Self {
        Self {
            portal_base_url: std::env::var("PORTAL_BASE_URL").unwrap_or(self.portal_base_url),
            submit_path: std::env::var("SUBMIT_PATH").unwrap_or(self.submit_path),
            documents_folder: std::env::var("DOCUMENTS_FOLDER").unwrap_or(self.documents_folder),
            capture_file: std::env::var("CAPTURE_FILE").unwrap_or(self.capture_file),
            nationality_csv: std::env::var("NATIONALITY_CSV").unwrap_or(self.nationality_csv),
            result_log_file: std::env::var("RESULT_LOG_FILE").unwrap_or(self.result_log_file),
            connect_timeout_secs: std::env::var("CONNECT_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(self.connect_timeout_secs),
            read_timeout_secs: std::env::var("READ_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(self.read_timeout_secs),
            min_request_interval_ms: std::env::var("MIN_REQUEST_INTERVAL_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(self.min_request_interval_ms),
            batch_delay_ms: std::env::var("BATCH_DELAY_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(self.batch_delay_ms),
            submit_retries: std::env::var("SUBMIT_RETRIES").ok().and_then(|v| v.parse().ok()).unwrap_or(self.submit_retries),
            submit_retry_delay_ms: std::env::var("SUBMIT_RETRY_DELAY_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(self.submit_retry_delay_ms),
            tls_relaxed: std::env::var("TLS_RELAXED").ok().and_then(|v| v.parse().ok()).unwrap_or(self.tls_relaxed),
            warmup_before_submit: std::env::var("WARMUP_BEFORE_SUBMIT").ok().and_then(|v| v.parse().ok()).unwrap_or(self.warmup_before_submit),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(self.verbose_logging),
            default_email: std::env::var("DEFAULT_EMAIL").unwrap_or(self.default_email),
            default_contact_no: std::env::var("DEFAULT_CONTACT_NO").unwrap_or(self.default_contact_no),
        }
    }

    /// 提交接口完整地址
    pub fn submit_url(&self) -> String {
        self.endpoint_url(&self.submit_path)
    }

    /// 门户任意路径的完整地址
    pub fn endpoint_url(&self, path: &str) -> String {
        format!("{}/{}", self.portal_base_url.trim_end_matches('/'), path)
    }
}

/// 门户要求的固定浏览器特征请求头
///
/// 除 Content-Type 和 Cookie 外每次请求都原样携带
pub fn static_headers() -> Vec<(&'static str, &'static str)> {
    vec![
        ("ADRUM", "isAjax:true"),
        ("Accept", "*/*"),
        ("Accept-Language", "en-US,en;q=0.9"),
        ("Connection", "keep-alive"),
        ("Origin", "https://eservices.mohre.gov.ae"),
        ("Referer", "https://eservices.mohre.gov.ae/TasheelWeb/home"),
        ("Sec-Fetch-Dest", "empty"),
        ("Sec-Fetch-Mode", "cors"),
        ("Sec-Fetch-Site", "same-origin"),
        (
            "User-Agent",
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/139.0.0.0 Safari/537.36",
        ),
        ("X-Requested-With", "XMLHttpRequest"),
        (
            "sec-ch-ua",
            "\"Not;A=Brand\";v=\"99\", \"Google Chrome\";v=\"139\", \"Chromium\";v=\"139\"",
        ),
        ("sec-ch-ua-mobile", "?0"),
        ("sec-ch-ua-platform", "\"Windows\""),
    ]
}
