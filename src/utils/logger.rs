use env_logger::{Builder, Target};
use log::LevelFilter;
use std::io::Write;

/// 初始化日志系统
/// 输出到 stderr, stdout 留给 IPC 数据流; RUST_LOG 可覆盖默认级别
pub fn init_logger() {
    init_logger_with_level(LevelFilter::Info);
}

/// 初始化日志系统(带自定义日志级别)
pub fn init_logger_with_level(level: LevelFilter) {
    let mut builder = Builder::new();

    builder
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {} {}:{}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(Target::Stderr)
        .filter_level(level)
        .parse_default_env();

    // 重复初始化时保留已有 logger
    if builder.try_init().is_ok() {
        log::info!("日志系统初始化完成,级别: {:?}", level);
    }
}
