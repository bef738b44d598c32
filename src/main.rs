use gtm_ops_console::commands::serve_stdio;
use gtm_ops_console::utils::logger;
use gtm_ops_console::AppState;
use std::sync::Arc;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // 初始化日志系统 (输出到 stderr, stdout 留给 IPC)
    logger::init_logger();

    let state = AppState::initialize()?;
    log::info!(
        "安全存储可用: {}",
        state.credentials.is_durable_available()
    );

    serve_stdio(Arc::new(state)).await?;

    log::info!("退出");
    Ok(())
}
