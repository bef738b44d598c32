use crate::models::error::{AppError, AppResult};
use crate::utils::paths;
use rusqlite::Connection;
use std::path::PathBuf;

/// 获取数据库文件路径
/// 数据库存储在应用数据目录: {app_data_dir}/console.db
pub fn get_db_path() -> AppResult<PathBuf> {
    let app_data_dir = paths::get_app_data_dir()?;

    // 确保目录存在
    paths::ensure_dir_exists(&app_data_dir)?;

    Ok(paths::get_db_path()?)
}

/// 初始化数据库
pub fn initialize_database() -> AppResult<Connection> {
    let db_path = get_db_path()?;

    log::info!("正在初始化数据库: {:?}", db_path);

    let conn = Connection::open(&db_path).map_err(|e| AppError::DatabaseError {
        message: format!("打开数据库失败: {}", e),
    })?;

    apply_schema(&conn)?;

    log::info!("数据库初始化完成");

    Ok(conn)
}

/// 初始化内存数据库 (测试或无持久化场景)
pub fn initialize_in_memory() -> AppResult<Connection> {
    let conn = Connection::open_in_memory().map_err(|e| AppError::DatabaseError {
        message: format!("创建内存数据库失败: {}", e),
    })?;

    apply_schema(&conn)?;
    Ok(conn)
}

/// 执行 schema.sql 创建表结构
pub fn apply_schema(conn: &Connection) -> AppResult<()> {
    let schema_sql = include_str!("schema.sql");
    conn.execute_batch(schema_sql)
        .map_err(|e| AppError::DatabaseError {
            message: format!("创建表结构失败: {}", e),
        })
}
