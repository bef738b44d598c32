use crate::models::error::{AppError, AppResult};
use rusqlite::{params, Connection, OptionalExtension};

/// 读取键对应的原始 JSON 文本
pub fn get_value(conn: &Connection, key: &str) -> AppResult<Option<String>> {
    conn.query_row(
        "SELECT value FROM KeyValueStore WHERE key = ?1",
        [key],
        |row| row.get(0),
    )
    .optional()
    .map_err(|e| AppError::DatabaseError {
        message: format!("读取 {} 失败: {}", key, e),
    })
}

/// 写入(覆盖)键对应的 JSON 文本
pub fn set_value(conn: &Connection, key: &str, value: &str) -> AppResult<()> {
    conn.execute(
        "INSERT INTO KeyValueStore (key, value, updated_at) VALUES (?1, ?2, CURRENT_TIMESTAMP)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP",
        params![key, value],
    )
    .map_err(|e| AppError::DatabaseError {
        message: format!("写入 {} 失败: {}", key, e),
    })?;
    Ok(())
}
