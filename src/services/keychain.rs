use crate::models::error::{AppError, AppResult};
use crate::utils::constants::{KEYCHAIN_ACCOUNT_NAME, KEYCHAIN_SERVICE_NAME};
use keyring::Entry;

/// 安全存储后端
/// 不存在的条目读取为 None, 删除不存在的条目视为成功
pub trait SecretBackend: Send + Sync {
    fn set_secret(&self, secret: &str) -> AppResult<()>;
    fn get_secret(&self) -> AppResult<Option<String>>;
    fn delete_secret(&self) -> AppResult<()>;
}

/// 系统密钥链后端
/// - Windows: Credential Manager
/// - macOS: Keychain
/// - Linux: Secret Service API / keyutils
pub struct KeychainBackend {
    entry: Entry,
}

impl KeychainBackend {
    /// 打开 webhook 密钥对应的密钥链条目
    pub fn open() -> AppResult<Self> {
        let entry = Entry::new(KEYCHAIN_SERVICE_NAME, KEYCHAIN_ACCOUNT_NAME).map_err(|e| {
            AppError::KeychainError {
                message: format!("创建密钥链条目失败: {}", e),
            }
        })?;

        Ok(Self { entry })
    }

    /// 获取服务名称
    pub fn service_name() -> &'static str {
        KEYCHAIN_SERVICE_NAME
    }
}

impl SecretBackend for KeychainBackend {
    fn set_secret(&self, secret: &str) -> AppResult<()> {
        log::info!("正在存储 webhook 密钥到系统密钥链");

        self.entry
            .set_password(secret)
            .map_err(|e| AppError::KeychainError {
                message: format!("存储密钥失败: {}", e),
            })
    }

    fn get_secret(&self) -> AppResult<Option<String>> {
        match self.entry.get_password() {
            Ok(secret) => Ok(Some(secret)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(AppError::KeychainError {
                message: format!("读取密钥失败: {}", e),
            }),
        }
    }

    fn delete_secret(&self) -> AppResult<()> {
        match self.entry.delete_password() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(AppError::KeychainError {
                message: format!("删除密钥失败: {}", e),
            }),
        }
    }
}
