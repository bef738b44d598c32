use crate::utils::time::format_seconds;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 传输层失败分类
/// 在检测到失败的位置分类一次, 之后的重试判断和提示文案都基于此枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// 超过单次请求超时, 请求被中止
    Timeout,

    /// DNS 解析失败
    Dns,

    /// 连接被拒绝
    ConnectionRefused,

    /// TLS/证书错误
    Tls,

    /// 主机或网络不可达
    HostUnreachable,

    /// 传输层连接超时
    ConnectTimeout,

    /// 其他网络错误
    Other,
}

impl FailureKind {
    /// 是否允许重试
    /// 超时、DNS 失败、主机不可达不重试
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            FailureKind::Timeout | FailureKind::Dns | FailureKind::HostUnreachable
        )
    }
}

/// 传输层失败: 分类 + 原始错误描述
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportFailure {
    pub kind: FailureKind,
    pub detail: String,
}

impl TransportFailure {
    pub fn new(kind: FailureKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    /// 请求超时
    pub fn timeout() -> Self {
        Self::new(FailureKind::Timeout, "request aborted")
    }

    /// 面向用户的提示文案
    /// 未归类的错误保留原始描述
    pub fn user_message(&self, request_timeout: Duration) -> String {
        match self.kind {
            FailureKind::Timeout => format!(
                "Request timeout ({}s exceeded)",
                format_seconds(request_timeout)
            ),
            FailureKind::Dns => "DNS lookup failed - check the URL".to_string(),
            FailureKind::ConnectionRefused => {
                "Connection refused - server not reachable".to_string()
            }
            FailureKind::Tls => "TLS/SSL certificate error".to_string(),
            FailureKind::HostUnreachable => {
                "Host unreachable - check network connection".to_string()
            }
            FailureKind::ConnectTimeout => "Connection timed out".to_string(),
            FailureKind::Other => self.detail.clone(),
        }
    }
}
