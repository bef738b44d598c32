use crate::models::failure_kind::FailureKind;
use std::error::Error as StdError;
use std::io;

/// 错误分类器 - 把传输层错误归入 FailureKind
/// 优先依据错误链中的 io::ErrorKind, 其次依据错误描述
pub struct ErrorClassifier;

impl ErrorClassifier {
    /// 分类 reqwest 错误
    pub fn classify(error: &reqwest::Error) -> FailureKind {
        if let Some(kind) = Self::classify_source_chain(error) {
            return kind;
        }

        if error.is_timeout() {
            return FailureKind::ConnectTimeout;
        }

        Self::classify_message(&Self::describe(error))
    }

    /// 遍历错误链, 找到第一个可识别的 io::Error
    pub fn classify_source_chain(error: &(dyn StdError + 'static)) -> Option<FailureKind> {
        let mut current: Option<&(dyn StdError + 'static)> = Some(error);
        while let Some(err) = current {
            if let Some(io_error) = err.downcast_ref::<io::Error>() {
                if let Some(kind) = Self::classify_io_kind(io_error.kind()) {
                    return Some(kind);
                }
            }
            current = err.source();
        }
        None
    }

    /// io::ErrorKind 到 FailureKind 的映射
    /// 主机不可达由错误描述识别
    pub fn classify_io_kind(kind: io::ErrorKind) -> Option<FailureKind> {
        match kind {
            io::ErrorKind::ConnectionRefused => Some(FailureKind::ConnectionRefused),
            io::ErrorKind::TimedOut => Some(FailureKind::ConnectTimeout),
            _ => None,
        }
    }

    /// 依据错误描述中的关键词分类
    pub fn classify_message(message: &str) -> FailureKind {
        let lower_msg = message.to_lowercase();

        // 1. DNS 解析失败
        if Self::contains_keyword(
            &lower_msg,
            &[
                "dns error",
                "failed to lookup address",
                "name or service not known",
                "no such host",
                "nodename nor servname",
                "enotfound",
            ],
        ) {
            return FailureKind::Dns;
        }

        // 2. 连接被拒绝
        if Self::contains_keyword(&lower_msg, &["connection refused", "econnrefused"]) {
            return FailureKind::ConnectionRefused;
        }

        // 3. TLS/证书错误
        if Self::contains_keyword(&lower_msg, &["certificate", "tls", "ssl"]) {
            return FailureKind::Tls;
        }

        // 4. 主机不可达
        if Self::contains_keyword(
            &lower_msg,
            &[
                "host unreachable",
                "no route to host",
                "network is unreachable",
                "ehostunreach",
            ],
        ) {
            return FailureKind::HostUnreachable;
        }

        // 5. 传输层连接超时
        if Self::contains_keyword(&lower_msg, &["timed out", "etimedout"]) {
            return FailureKind::ConnectTimeout;
        }

        FailureKind::Other
    }

    /// 拼接完整错误链描述
    pub fn describe(error: &(dyn StdError + 'static)) -> String {
        let mut parts = vec![error.to_string()];
        let mut current = error.source();
        while let Some(err) = current {
            let text = err.to_string();
            if !parts.iter().any(|part| part.contains(&text)) {
                parts.push(text);
            }
            current = err.source();
        }
        parts.join(": ")
    }

    fn contains_keyword(message: &str, keywords: &[&str]) -> bool {
        keywords.iter().any(|keyword| message.contains(*keyword))
    }
}
