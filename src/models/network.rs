use crate::utils::redact::{redact_json, redact_secret};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// 网络请求的统一结果
/// status = 0 表示请求未到达传输层 (配置错误、DNS、连接拒绝、超时等)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkResponse {
    pub ok: bool,
    pub status: u16,
    /// 可解析时为 JSON, 否则为原始文本
    pub body: Value,
    pub raw: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<u64>,
}

/// 网络请求入参
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkRequestInput {
    pub method: String,
    pub endpoint: String,
    #[serde(default)]
    pub body: Option<Value>,
}

impl NetworkResponse {
    /// 由收到的 HTTP 响应构造; 响应体尽量按 JSON 解析
    pub fn from_http(status: u16, raw: String, response_time_ms: u64) -> Self {
        let body = serde_json::from_str::<Value>(&raw).unwrap_or_else(|_| Value::String(raw.clone()));

        NetworkResponse {
            ok: (200..300).contains(&status),
            status,
            body,
            raw,
            error: None,
            response_time_ms: Some(response_time_ms),
        }
    }

    /// 传输层失败
    pub fn failure(message: impl Into<String>, response_time_ms: Option<u64>) -> Self {
        let message = message.into();
        NetworkResponse {
            ok: false,
            status: 0,
            body: json!({ "error": message }),
            raw: message.clone(),
            error: Some(message),
            response_time_ms,
        }
    }

    /// 配置错误, 在任何网络 I/O 之前短路返回
    pub fn config_error(summary: &str) -> Self {
        let message = format!("{}. Please set it in Settings.", summary);
        NetworkResponse {
            ok: false,
            status: 0,
            body: json!({ "error": message }),
            raw: summary.to_string(),
            error: Some(message),
            response_time_ms: None,
        }
    }

    /// 是否在到达传输层之前失败
    pub fn never_reached_transport(&self) -> bool {
        self.status == 0
    }

    /// 用于展示和记录的错误详情: 对象响应体取 JSON 文本, 否则取 raw
    pub fn error_detail(&self) -> String {
        match &self.body {
            Value::Object(_) => self.body.to_string(),
            _ => self.raw.clone(),
        }
    }

    /// 替换所有可能展示给用户的字段中的密钥原文
    pub fn sanitized(self, secret: Option<&str>) -> Self {
        NetworkResponse {
            ok: self.ok,
            status: self.status,
            body: redact_json(self.body, secret),
            raw: redact_secret(&self.raw, secret),
            error: self.error.map(|error| redact_secret(&error, secret)),
            response_time_ms: self.response_time_ms,
        }
    }
}
