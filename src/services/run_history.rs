use crate::db::{kv, DbPool};
use crate::models::error::{AppError, AppResult};
use crate::models::recent_run::RecentRun;
use crate::utils::constants::{MAX_RECENT_RUNS, RECENT_RUNS_KEY};
use rusqlite::Connection;
use serde_json::Value;
use std::sync::Arc;

/// 最近运行记录存储
/// 新记录在前, 最多保留 MAX_RECENT_RUNS 条;
/// 读取失败视为数据损坏, 自动重置为空; 写入失败返回给调用方
#[derive(Clone)]
pub struct RunHistoryStore {
    pool: Arc<DbPool>,
}

impl RunHistoryStore {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    /// 列出所有记录 (新记录在前)
    pub fn list(&self) -> Vec<RecentRun> {
        match self.pool.with_connection(read_runs) {
            Ok(runs) => runs,
            Err(e) => {
                log::error!("最近运行记录已损坏, 重置为空: {}", e);
                self.reset();
                Vec::new()
            }
        }
    }

    /// 添加记录到最前面, 超出上限时丢弃最旧的记录
    pub fn add(&self, run: RecentRun) -> AppResult<()> {
        self.pool
            .transaction(|conn| {
                let mut runs = read_runs_or_empty(conn);
                runs.insert(0, run);
                runs.truncate(MAX_RECENT_RUNS);
                write_runs(conn, &runs)
            })
            .map_err(|e| {
                log::error!("添加最近运行记录失败: {}", e);
                e
            })
    }

    /// 删除指定记录; 不存在时不报错
    pub fn delete(&self, id: &str) -> AppResult<()> {
        self.pool
            .transaction(|conn| {
                let mut runs = read_runs_or_empty(conn);
                if let Some(index) = runs.iter().position(|run| run.id == id) {
                    runs.remove(index);
                }
                write_runs(conn, &runs)
            })
            .map_err(|e| {
                log::error!("删除最近运行记录失败: {}", e);
                e
            })
    }

    /// 清空所有记录
    pub fn clear(&self) -> AppResult<()> {
        self.pool
            .with_connection(|conn| write_runs(conn, &[]))
            .map_err(|e| {
                log::error!("清空最近运行记录失败: {}", e);
                e
            })
    }

    /// 重置为空集合; 失败只记录日志
    fn reset(&self) {
        if let Err(e) = self.pool.with_connection(|conn| write_runs(conn, &[])) {
            log::error!("重置最近运行记录失败: {}", e);
        }
    }
}

fn read_runs(conn: &Connection) -> AppResult<Vec<RecentRun>> {
    let Some(raw) = kv::get_value(conn, RECENT_RUNS_KEY)? else {
        return Ok(Vec::new());
    };

    let value: Value = serde_json::from_str(&raw)?;
    if !value.is_array() {
        return Err(AppError::InvalidData {
            message: "最近运行记录不是数组".to_string(),
        });
    }

    Ok(serde_json::from_value(value)?)
}

fn read_runs_or_empty(conn: &Connection) -> Vec<RecentRun> {
    read_runs(conn).unwrap_or_else(|e| {
        log::error!("最近运行记录已损坏, 按空集合处理: {}", e);
        Vec::new()
    })
}

fn write_runs(conn: &Connection, runs: &[RecentRun]) -> AppResult<()> {
    let raw = serde_json::to_string(runs)?;
    kv::set_value(conn, RECENT_RUNS_KEY, &raw)
}
