use crate::app_state::AppState;
use crate::models::error::AppResult;
use crate::models::recent_run::RecentRun;

/// 列出最近运行记录 (新记录在前)
pub fn list_recent_runs(state: &AppState) -> AppResult<Vec<RecentRun>> {
    Ok(state.history.list())
}

/// 添加运行记录
pub fn add_recent_run(state: &AppState, run: RecentRun) -> AppResult<()> {
    log::debug!("添加运行记录: {} ({})", run.id, run.category.as_str());
    state.history.add(run)
}

/// 删除运行记录
pub fn delete_recent_run(state: &AppState, id: String) -> AppResult<()> {
    log::debug!("删除运行记录: {}", id);
    state.history.delete(&id)
}

/// 清空运行记录
pub fn clear_recent_runs(state: &AppState) -> AppResult<()> {
    log::info!("清空运行记录");
    state.history.clear()
}
