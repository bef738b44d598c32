use crate::models::error::{AppError, AppResult};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

/// 数据库连接池
/// 使用简单的单连接模式, 本地键值存储的访问量很小
#[derive(Clone)]
pub struct DbPool {
    connection: Arc<Mutex<Connection>>,
}

impl DbPool {
    /// 创建新的数据库连接池
    pub fn new(conn: Connection) -> Self {
        DbPool {
            connection: Arc::new(Mutex::new(conn)),
        }
    }

    /// 执行只读或单条写入操作
    /// 接受一个闭包,传入连接引用
    pub fn with_connection<F, T>(&self, f: F) -> AppResult<T>
    where
        F: FnOnce(&Connection) -> AppResult<T>,
    {
        let conn = self.connection.lock().map_err(|e| AppError::DatabaseError {
            message: format!("获取数据库连接锁失败: {}", e),
        })?;
        f(&conn)
    }

    /// 执行事务操作
    /// 自动处理 BEGIN/COMMIT/ROLLBACK
    pub fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: FnOnce(&Connection) -> AppResult<T>,
    {
        let conn = self.connection.lock().map_err(|e| AppError::DatabaseError {
            message: format!("获取数据库连接锁失败: {}", e),
        })?;

        conn.execute("BEGIN TRANSACTION", [])
            .map_err(|e| AppError::DatabaseError {
                message: format!("开始事务失败: {}", e),
            })?;

        match f(&conn) {
            Ok(value) => {
                conn.execute("COMMIT", []).map_err(|e| AppError::DatabaseError {
                    message: format!("提交事务失败: {}", e),
                })?;
                Ok(value)
            }
            Err(err) => {
                let _ = conn.execute("ROLLBACK", []);
                Err(err)
            }
        }
    }

    /// 检查连接健康状态
    pub fn health_check(&self) -> AppResult<()> {
        self.with_connection(|conn| {
            conn.query_row("SELECT 1", [], |_| Ok(()))
                .map_err(|e| AppError::DatabaseError {
                    message: format!("健康检查失败: {}", e),
                })?;
            Ok(())
        })
    }
}
