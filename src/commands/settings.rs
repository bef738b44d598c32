use crate::app_state::AppState;
use crate::models::error::{AppError, AppResult};
use crate::models::settings::Settings;
use crate::utils::constants::HEALTH_CHECK_PATH;
use crate::utils::time::now_utc;
use serde::{Deserialize, Serialize};

/// 连接测试结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionTestResult {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<u64>,
}

/// 获取设置
pub fn get_settings(state: &AppState) -> AppResult<Settings> {
    log::debug!("获取设置");
    state.settings.get()
}

/// 保存设置 (整体覆盖)
///
/// # 参数
/// - `settings`: 完整的设置记录; base URL 为空表示清除配置
pub fn set_settings(state: &AppState, settings: Settings) -> AppResult<Settings> {
    if !settings.base_url.trim().is_empty() {
        Settings::validate_base_url(&settings.base_url).map_err(|message| {
            AppError::ValidationError {
                field: "baseUrl".to_string(),
                message,
            }
        })?;
    }

    log::info!("保存设置: {}", settings.base_url);
    state.settings.set(&settings)?;
    Ok(settings)
}

/// 测试与后端的连接
/// 成功时记录测试时间
pub async fn test_connection(state: &AppState) -> AppResult<ConnectionTestResult> {
    log::info!("测试连接");

    let response = state.dispatcher.dispatch("GET", HEALTH_CHECK_PATH, None).await;
    let response_time_ms = response.response_time_ms;

    if response.ok {
        let mut settings = state.settings.get()?;
        settings.last_successful_test_at = Some(now_utc());
        state.settings.set(&settings)?;

        return Ok(ConnectionTestResult {
            success: true,
            message: format!(
                "Connection successful! ({}ms)",
                response_time_ms.unwrap_or_default()
            ),
            response_time_ms,
        });
    }

    let message = match response.status {
        0 => "Unable to reach server - check URL and network connection".to_string(),
        status if status >= 500 => format!("Server error (HTTP {})", status),
        status if status >= 400 => format!("Client error (HTTP {})", status),
        status => format!("Unexpected response (HTTP {})", status),
    };
    log::warn!("连接测试失败: {}", message);

    Ok(ConnectionTestResult {
        success: false,
        message,
        response_time_ms,
    })
}
