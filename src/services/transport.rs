/**
 * HTTP Transport
 * 调度器与 HTTP 客户端之间的边界
 *
 * - OutboundRequest 已包含最终 URL、请求头和序列化后的请求体
 * - 失败在这里分类一次, 之后只传递 FailureKind
 * - 超时由调度器控制, 传输层不设置整体超时
 */

use crate::models::error::{AppError, AppResult};
use crate::models::failure_kind::{FailureKind, TransportFailure};
use crate::services::error_classifier::ErrorClassifier;
use async_trait::async_trait;

/// 完整的出站请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundRequest {
    pub method: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl OutboundRequest {
    /// 查找请求头 (名称不区分大小写)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// 收到的 HTTP 响应
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: OutboundRequest) -> Result<TransportResponse, TransportFailure>;
}

/// 基于 reqwest 的传输实现
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("gtm-ops-console/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::ServiceError {
                message: format!("创建HTTP客户端失败: {}", e),
            })?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: OutboundRequest) -> Result<TransportResponse, TransportFailure> {
        let method = reqwest::Method::from_bytes(request.method.as_bytes()).map_err(|_| {
            TransportFailure::new(
                FailureKind::Other,
                format!("Invalid HTTP method: {}", request.method),
            )
        })?;

        let mut builder = self.client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| {
            let kind = ErrorClassifier::classify(&e);
            log::debug!("请求失败 ({:?}): {}", kind, e);
            TransportFailure::new(kind, ErrorClassifier::describe(&e))
        })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            TransportFailure::new(ErrorClassifier::classify(&e), ErrorClassifier::describe(&e))
        })?;

        Ok(TransportResponse { status, body })
    }
}
