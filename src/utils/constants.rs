//! 应用常量定义
//!
//! 集中管理密钥链标识、请求调度参数和本地存储键

/// 系统密钥链服务名
pub const KEYCHAIN_SERVICE_NAME: &str = "gtm-ops-console";

/// 系统密钥链账户名
pub const KEYCHAIN_ACCOUNT_NAME: &str = "webhook-secret";

/// 默认的 webhook 认证请求头
pub const DEFAULT_AUTH_HEADER_NAME: &str = "x-webhook-secret";

/// 健康检查路径 (免密钥、免认证头)
pub const HEALTH_CHECK_PATH: &str = "/healthz";

/// 单次请求超时(毫秒), AI 生成类 webhook 较慢
pub const REQUEST_TIMEOUT_MS: u64 = 20_000;

/// 网络错误重试前的等待(毫秒)
pub const RETRY_DELAY_MS: u64 = 500;

/// 最大重试次数
pub const MAX_RETRIES: u32 = 1;

/// 请求完成后去重键保留时间(毫秒)
pub const DEDUP_WINDOW_MS: u64 = 100;

/// 最近运行记录上限
pub const MAX_RECENT_RUNS: usize = 20;

/// 密钥脱敏占位符
pub const REDACTION_PLACEHOLDER: &str = "[SECRET]";

/// 本地存储键: 设置
pub const SETTINGS_KEY: &str = "settings";

/// 本地存储键: 最近运行记录
pub const RECENT_RUNS_KEY: &str = "recentRuns";
