use crate::models::failure_kind::FailureKind;
use crate::models::retry_strategy::RetryStrategy;
use std::time::Duration;

/// 重试管理器 - 判断单个请求的失败是否重试
/// 每次调度独立计数, 不跨请求累计
#[derive(Debug, Clone)]
pub struct RetryManager {
    strategy: RetryStrategy,
}

impl RetryManager {
    /// 创建新的重试管理器
    pub fn new(strategy: RetryStrategy) -> Self {
        Self { strategy }
    }

    /// 创建使用默认策略的重试管理器
    pub fn with_default_strategy() -> Self {
        Self::new(RetryStrategy::default())
    }

    /// 判断是否应该重试
    /// 参数:
    ///   - kind: 本次失败的分类
    ///   - retries_done: 已经重试过的次数
    pub fn should_retry(&self, kind: FailureKind, retries_done: u32) -> bool {
        kind.is_retryable() && retries_done < self.strategy.max_retries
    }

    /// 重试前的等待时间 (固定延迟)
    pub fn retry_delay(&self) -> Duration {
        self.strategy.retry_delay()
    }

    /// 获取当前策略的引用
    pub fn get_strategy(&self) -> &RetryStrategy {
        &self.strategy
    }
}
