use crate::utils::constants::{DEDUP_WINDOW_MS, MAX_RETRIES, REQUEST_TIMEOUT_MS, RETRY_DELAY_MS};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 请求调度策略配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryStrategy {
    /// 单次请求超时 (毫秒)
    pub request_timeout_ms: u64,

    /// 重试前的固定延迟 (毫秒)
    pub retry_delay_ms: u64,

    /// 最大重试次数 (0-3)
    pub max_retries: u32,

    /// 请求完成后去重键保留时间 (毫秒)
    pub dedup_window_ms: u64,
}

impl RetryStrategy {
    /// 创建新的调度策略
    pub fn new(
        request_timeout_ms: u64,
        retry_delay_ms: u64,
        max_retries: u32,
        dedup_window_ms: u64,
    ) -> Self {
        Self {
            request_timeout_ms,
            retry_delay_ms,
            max_retries,
            dedup_window_ms,
        }
    }

    /// 创建默认调度策略
    pub fn default_strategy() -> Self {
        Self {
            request_timeout_ms: REQUEST_TIMEOUT_MS, // 20秒
            retry_delay_ms: RETRY_DELAY_MS,         // 500毫秒
            max_retries: MAX_RETRIES,               // 1次
            dedup_window_ms: DEDUP_WINDOW_MS,       // 100毫秒
        }
    }

    /// 验证策略参数
    pub fn validate(&self) -> Result<(), String> {
        if self.request_timeout_ms < 1000 || self.request_timeout_ms > 120_000 {
            return Err("请求超时必须在 1000-120000 毫秒之间".to_string());
        }

        if self.retry_delay_ms > 10_000 {
            return Err("重试延迟不能超过 10000 毫秒".to_string());
        }

        if self.max_retries > 3 {
            return Err("重试次数不能超过 3".to_string());
        }

        if self.dedup_window_ms > 5_000 {
            return Err("去重窗口不能超过 5000 毫秒".to_string());
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn dedup_window(&self) -> Duration {
        Duration::from_millis(self.dedup_window_ms)
    }
}

impl Default for RetryStrategy {
    fn default() -> Self {
        Self::default_strategy()
    }
}
