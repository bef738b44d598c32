use crate::db::{kv, DbPool};
use crate::models::error::AppResult;
use crate::models::settings::Settings;
use crate::utils::constants::SETTINGS_KEY;
use std::sync::Arc;

/// 设置存储
/// 整体覆盖写入, 不做部分合并; 调用方需先读后改再写
#[derive(Clone)]
pub struct SettingsStore {
    pool: Arc<DbPool>,
}

impl SettingsStore {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    /// 读取设置; 从未写入时返回默认值
    pub fn get(&self) -> AppResult<Settings> {
        let raw = self.pool.with_connection(|conn| kv::get_value(conn, SETTINGS_KEY))?;

        let Some(raw) = raw else {
            return Ok(Settings::default());
        };

        match serde_json::from_str::<Settings>(&raw) {
            Ok(settings) => Ok(settings),
            Err(e) => {
                log::warn!("设置记录无法解析, 使用默认值: {}", e);
                Ok(Settings::default())
            }
        }
    }

    /// 写入设置 (整体覆盖)
    pub fn set(&self, settings: &Settings) -> AppResult<()> {
        let raw = serde_json::to_string(settings)?;
        self.pool
            .with_connection(|conn| kv::set_value(conn, SETTINGS_KEY, &raw))?;

        log::info!("设置已保存");
        Ok(())
    }
}
