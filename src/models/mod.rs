pub mod error;
pub mod failure_kind;
pub mod network;
pub mod recent_run;
pub mod retry_strategy;
pub mod settings;

// 重新导出常用类型
pub use error::{AppError, AppResult};
pub use failure_kind::{FailureKind, TransportFailure};
pub use network::{NetworkRequestInput, NetworkResponse};
pub use recent_run::{RecentRun, RunCategory};
pub use retry_strategy::RetryStrategy;
pub use settings::{Settings, Theme};
