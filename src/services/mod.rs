pub mod dispatcher;
pub mod error_classifier;
pub mod keychain;
pub mod retry_manager;
pub mod run_history;
pub mod secrets;
pub mod settings_store;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

// 重新导出常用类型
pub use dispatcher::RequestDispatcher;
pub use error_classifier::ErrorClassifier;
pub use retry_manager::RetryManager;
pub use run_history::RunHistoryStore;
pub use secrets::{CredentialStore, SecretStatus, StoreOutcome};
pub use settings_store::SettingsStore;
pub use transport::{HttpTransport, OutboundRequest, ReqwestTransport, TransportResponse};
