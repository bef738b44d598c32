use crate::db::{initialize_database, DbPool};
use crate::models::error::AppResult;
use crate::models::retry_strategy::RetryStrategy;
use crate::services::dispatcher::RequestDispatcher;
use crate::services::run_history::RunHistoryStore;
use crate::services::secrets::CredentialStore;
use crate::services::settings_store::SettingsStore;
use crate::services::transport::{HttpTransport, ReqwestTransport};
use std::sync::Arc;

/// 进程内共享的服务集合
pub struct AppState {
    pub pool: Arc<DbPool>,
    pub settings: SettingsStore,
    pub credentials: Arc<CredentialStore>,
    pub history: RunHistoryStore,
    pub dispatcher: RequestDispatcher,
}

impl AppState {
    pub fn new(
        pool: Arc<DbPool>,
        credentials: Arc<CredentialStore>,
        transport: Arc<dyn HttpTransport>,
        strategy: RetryStrategy,
    ) -> Self {
        let settings = SettingsStore::new(pool.clone());
        let history = RunHistoryStore::new(pool.clone());
        let dispatcher = RequestDispatcher::new(
            settings.clone(),
            credentials.clone(),
            transport,
            strategy,
        );

        Self {
            pool,
            settings,
            credentials,
            history,
            dispatcher,
        }
    }

    /// 使用本地数据库、系统密钥链和 reqwest 初始化
    pub fn initialize() -> AppResult<Self> {
        let conn = initialize_database()?;
        let pool = Arc::new(DbPool::new(conn));
        pool.health_check()?;
        log::info!("数据库连接池已创建");

        let strategy = RetryStrategy::default();
        strategy.validate()?;

        let transport = Arc::new(ReqwestTransport::new()?);
        let credentials = Arc::new(CredentialStore::with_keychain());

        log::info!(
            "请求调度器已初始化 (超时 {}ms, 重试 {} 次)",
            strategy.request_timeout_ms,
            strategy.max_retries
        );

        Ok(Self::new(pool, credentials, transport, strategy))
    }
}
