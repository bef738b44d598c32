use std::path::{Path, PathBuf};

/// 应用目录名
const APP_DIR_NAME: &str = "gtm-ops-console";

/// 获取应用数据目录
/// Windows: C:\Users\<用户名>\AppData\Roaming\gtm-ops-console
/// macOS: ~/Library/Application Support/gtm-ops-console
/// Linux: ~/.local/share/gtm-ops-console
pub fn get_app_data_dir() -> Result<PathBuf, String> {
    let data_dir = dirs::data_dir()
        .ok_or_else(|| "无法获取应用数据目录".to_string())?
        .join(APP_DIR_NAME);
    Ok(data_dir)
}

/// 获取本地数据库文件路径
pub fn get_db_path() -> Result<PathBuf, String> {
    Ok(get_app_data_dir()?.join("console.db"))
}

/// 确保目录存在,如果不存在则创建
pub fn ensure_dir_exists(path: &Path) -> Result<(), String> {
    if !path.exists() {
        std::fs::create_dir_all(path).map_err(|e| format!("创建目录失败: {}", e))?;
    }
    Ok(())
}
