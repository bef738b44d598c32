// Commands 模块
pub mod ipc;
pub mod network;
pub mod recent_runs;
pub mod secrets;
pub mod settings;

// 重新导出常用命令
pub use network::network_request;

pub use recent_runs::{add_recent_run, clear_recent_runs, delete_recent_run, list_recent_runs};

pub use secrets::{clear_secret, get_secret, store_secret};

pub use settings::{get_settings, set_settings, test_connection, ConnectionTestResult};

pub use ipc::{handle, serve, serve_stdio};
