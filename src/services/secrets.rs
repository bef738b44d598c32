use crate::models::error::{AppError, AppResult};
use crate::services::keychain::{KeychainBackend, SecretBackend};
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard, OnceLock};

/// 后端探测函数, 进程生命周期内最多调用一次
pub type BackendProbe = Box<dyn Fn() -> AppResult<Box<dyn SecretBackend>> + Send + Sync>;

/// 密钥读取结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretStatus {
    pub secret: Option<String>,
    /// 是否来自系统安全存储 (false 表示仅在内存中, 重启后丢失)
    pub is_durable: bool,
}

/// 密钥写入结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreOutcome {
    pub stored_durably: bool,
}

/// 凭证存储
/// 优先使用系统安全存储, 不可用或失败时退回内存;
/// 内存中的影子值同时作为读取失败时的后备
pub struct CredentialStore {
    probe: BackendProbe,
    backend: OnceLock<Option<Box<dyn SecretBackend>>>,
    shadow: Mutex<Option<String>>,
}

impl CredentialStore {
    /// 使用自定义后端探测函数创建
    pub fn new<F>(probe: F) -> Self
    where
        F: Fn() -> AppResult<Box<dyn SecretBackend>> + Send + Sync + 'static,
    {
        Self {
            probe: Box::new(probe),
            backend: OnceLock::new(),
            shadow: Mutex::new(None),
        }
    }

    /// 使用系统密钥链
    pub fn with_keychain() -> Self {
        Self::new(|| {
            KeychainBackend::open().map(|backend| Box::new(backend) as Box<dyn SecretBackend>)
        })
    }

    /// 仅内存存储
    pub fn volatile() -> Self {
        let store = Self::new(|| {
            Err(AppError::KeychainError {
                message: "安全存储已禁用".to_string(),
            })
        });
        // 直接标记为不可用, 跳过探测
        let _ = store.backend.set(None);
        store
    }

    /// 系统安全存储是否可用
    pub fn is_durable_available(&self) -> bool {
        self.backend().is_some()
    }

    /// 存储密钥; 调用方看来总是成功, 返回实际使用的存储层级
    pub fn store(&self, secret: &str) -> StoreOutcome {
        *self.shadow() = Some(secret.to_string());

        let Some(backend) = self.backend() else {
            log::warn!("安全存储不可用, 密钥仅保存在内存中");
            return StoreOutcome {
                stored_durably: false,
            };
        };

        match backend.set_secret(secret) {
            Ok(()) => {
                log::info!("密钥已存储到系统安全存储");
                StoreOutcome {
                    stored_durably: true,
                }
            }
            Err(e) => {
                log::error!("存储密钥到系统安全存储失败, 退回内存: {}", e);
                StoreOutcome {
                    stored_durably: false,
                }
            }
        }
    }

    /// 读取密钥
    pub fn get(&self) -> SecretStatus {
        let shadow = self.shadow().clone();

        let Some(backend) = self.backend() else {
            return SecretStatus {
                secret: shadow,
                is_durable: false,
            };
        };

        match backend.get_secret() {
            Ok(Some(secret)) => SecretStatus {
                secret: Some(secret),
                is_durable: true,
            },
            // 上次写入退回了内存
            Ok(None) if shadow.is_some() => SecretStatus {
                secret: shadow,
                is_durable: false,
            },
            Ok(None) => SecretStatus {
                secret: None,
                is_durable: true,
            },
            Err(e) => {
                log::error!("读取系统安全存储失败, 使用内存中的密钥: {}", e);
                SecretStatus {
                    secret: shadow,
                    is_durable: false,
                }
            }
        }
    }

    /// 清除密钥; 安全存储删除失败只记录日志
    pub fn clear(&self) {
        if let Some(backend) = self.backend() {
            if let Err(e) = backend.delete_secret() {
                log::warn!("从系统安全存储删除密钥失败: {}", e);
            }
        }
        *self.shadow() = None;
        log::info!("密钥已清除");
    }

    fn backend(&self) -> Option<&dyn SecretBackend> {
        self.backend
            .get_or_init(|| match (self.probe)() {
                Ok(backend) => {
                    log::info!("系统安全存储可用, 密钥将持久保存");
                    Some(backend)
                }
                Err(e) => {
                    log::warn!("系统安全存储不可用, 密钥仅在本次会话有效: {}", e);
                    None
                }
            })
            .as_deref()
    }

    fn shadow(&self) -> MutexGuard<'_, Option<String>> {
        self.shadow.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
