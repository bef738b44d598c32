pub mod init;
pub mod kv;
pub mod pool;

// 重新导出常用类型和函数
pub use init::{initialize_database, initialize_in_memory};
pub use pool::DbPool;
