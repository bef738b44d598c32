use crate::utils::constants::REDACTION_PLACEHOLDER;
use serde_json::Value;

/// 将文本中出现的密钥原文全部替换为占位符
/// 密钥为空时原样返回
pub fn redact_secret(text: &str, secret: Option<&str>) -> String {
    match secret {
        Some(secret) if !secret.is_empty() => text.replace(secret, REDACTION_PLACEHOLDER),
        _ => text.to_string(),
    }
}

/// 递归替换 JSON 中所有字符串值(包括对象键)里的密钥原文
pub fn redact_json(value: Value, secret: Option<&str>) -> Value {
    let secret = match secret {
        Some(secret) if !secret.is_empty() => secret,
        _ => return value,
    };

    match value {
        Value::String(text) => Value::String(text.replace(secret, REDACTION_PLACEHOLDER)),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| redact_json(item, Some(secret)))
                .collect(),
        ),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, item)| {
                    (
                        key.replace(secret, REDACTION_PLACEHOLDER),
                        redact_json(item, Some(secret)),
                    )
                })
                .collect(),
        ),
        other => other,
    }
}
