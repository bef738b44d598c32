use crate::models::network::NetworkResponse;
use crate::utils::time::now_utc;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// RecentRun (最近运行记录) 数据模型
/// 创建后不再修改, 只能整体删除
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentRun {
    /// 记录唯一标识符
    pub id: String,

    /// 产生该记录的表单
    pub category: RunCategory,

    /// 表单输入 (插入顺序即展示顺序)
    pub inputs: Map<String, Value>,

    /// 是否成功
    pub succeeded: bool,

    /// 发生时间
    pub occurred_at: DateTime<Utc>,

    /// 简短摘要
    pub display_snippet: String,

    /// 响应的结构化摘录
    pub result_summary: Map<String, Value>,
}

/// 运行记录分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunCategory {
    /// 线索搜索
    Leads,

    /// 回复草稿生成
    Drafts,

    /// 冷邮件发送
    Email,

    /// 潜在客户
    Prospects,

    /// 跟进审查
    Followups,
}

impl RunCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunCategory::Leads => "leads",
            RunCategory::Drafts => "drafts",
            RunCategory::Email => "email",
            RunCategory::Prospects => "prospects",
            RunCategory::Followups => "followups",
        }
    }
}

impl RecentRun {
    /// 创建新记录, 自动生成 ID 和时间戳
    pub fn new(
        category: RunCategory,
        inputs: Map<String, Value>,
        succeeded: bool,
        display_snippet: impl Into<String>,
        result_summary: Map<String, Value>,
    ) -> Self {
        RecentRun {
            id: uuid::Uuid::new_v4().to_string(),
            category,
            inputs,
            succeeded,
            occurred_at: now_utc(),
            display_snippet: display_snippet.into(),
            result_summary,
        }
    }

    /// 由失败响应创建记录
    pub fn failed(category: RunCategory, inputs: Map<String, Value>, response: &NetworkResponse) -> Self {
        let mut summary = Map::new();
        summary.insert("error".to_string(), Value::String(response.error_detail()));
        Self::new(category, inputs, false, "error", summary)
    }
}
