use crate::utils::constants::DEFAULT_AUTH_HEADER_NAME;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Settings (连接设置) 数据模型
/// 单例记录, 未写入前读取返回默认值; 缺失字段按默认值补齐
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// webhook 后端根地址, 空字符串表示未配置
    pub base_url: String,

    /// 携带密钥的请求头名称
    pub auth_header_name: String,

    /// 最近一次连接测试成功的时间
    pub last_successful_test_at: Option<DateTime<Utc>>,

    /// 界面主题
    pub theme: Theme,
}

/// 界面主题
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// 跟随系统
    #[default]
    Auto,

    /// 浅色
    Light,

    /// 深色
    Dark,
}

impl Settings {
    /// 去掉末尾斜杠后的 base URL; 未配置时返回 None
    pub fn normalized_base_url(&self) -> Option<&str> {
        let trimmed = self.base_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    }

    /// 实际使用的认证请求头名称 (空白时回退到默认值)
    pub fn effective_auth_header_name(&self) -> &str {
        let name = self.auth_header_name.trim();
        if name.is_empty() {
            DEFAULT_AUTH_HEADER_NAME
        } else {
            name
        }
    }

    /// 验证 base URL 格式
    /// 设置存储层不做校验, 由调用方在保存前使用
    pub fn validate_base_url(url: &str) -> Result<(), String> {
        let url = url.trim();
        if url.is_empty() {
            return Err("Base URL 不能为空".to_string());
        }

        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err("Base URL 必须以 http:// 或 https:// 开头".to_string());
        }

        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            base_url: String::new(),
            auth_header_name: DEFAULT_AUTH_HEADER_NAME.to_string(),
            last_successful_test_at: None,
            theme: Theme::Auto,
        }
    }
}
