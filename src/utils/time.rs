//! 时间工具模块
//!
//! 持久化的时间戳统一使用 UTC, 日志使用本地时区

use chrono::{DateTime, Utc};

/// 获取当前 UTC 时间, 用于写入设置和运行记录
pub fn now_utc() -> DateTime<Utc> {
    Utc::now()
}

/// 将 Duration 转为毫秒数 (u64)
pub fn millis(duration: std::time::Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// 以秒为单位格式化 Duration, 整秒不带小数
///
/// 20s -> "20", 1.5s -> "1.5"
pub fn format_seconds(duration: std::time::Duration) -> String {
    if duration.subsec_millis() == 0 {
        duration.as_secs().to_string()
    } else {
        format!("{}", duration.as_secs_f64())
    }
}
