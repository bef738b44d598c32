use crate::app_state::AppState;
use crate::models::error::{AppError, AppResult};
use crate::services::secrets::{SecretStatus, StoreOutcome};

/// 保存 webhook 密钥
/// 安全存储不可用时退回内存, 由 `stored_durably` 告知调用方
pub fn store_secret(state: &AppState, secret: String) -> AppResult<StoreOutcome> {
    if secret.trim().is_empty() {
        return Err(AppError::ValidationError {
            field: "secret".to_string(),
            message: "密钥不能为空".to_string(),
        });
    }

    let outcome = state.credentials.store(&secret);
    log::info!("密钥已保存 (持久化: {})", outcome.stored_durably);
    Ok(outcome)
}

/// 读取 webhook 密钥
pub fn get_secret(state: &AppState) -> AppResult<SecretStatus> {
    Ok(state.credentials.get())
}

/// 清除 webhook 密钥
pub fn clear_secret(state: &AppState) -> AppResult<()> {
    state.credentials.clear();
    log::info!("密钥已清除");
    Ok(())
}
