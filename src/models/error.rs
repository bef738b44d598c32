use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 应用错误类型
/// 只用于本地存储与设置层; 网络请求失败统一归一化为 NetworkResponse
#[derive(Error, Debug, Serialize, Deserialize)]
#[serde(tag = "error", content = "details")]
pub enum AppError {
    /// 输入参数验证失败
    #[error("输入参数验证失败: {field} - {message}")]
    ValidationError { field: String, message: String },

    /// 数据库操作失败
    #[error("数据库操作失败: {message}")]
    DatabaseError { message: String },

    /// 系统密钥链操作失败
    #[error("系统密钥链操作失败: {message}")]
    KeychainError { message: String },

    /// 服务错误
    #[error("服务错误: {message}")]
    ServiceError { message: String },

    /// 系统调用失败
    #[error("系统调用失败: {message}")]
    SystemError { message: String },

    /// IO 错误
    #[error("IO 错误: {message}")]
    IoError { message: String },

    /// 无效数据
    #[error("无效数据: {message}")]
    InvalidData { message: String },

    /// 解析错误
    #[error("解析错误: {message}")]
    ParseError { message: String },
}

/// 错误响应格式
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<AppError> for ErrorResponse {
    fn from(error: AppError) -> Self {
        ErrorResponse {
            error: error.error_type(),
            message: error.to_string(),
            details: None,
        }
    }
}

impl AppError {
    /// 获取错误类型字符串
    pub fn error_type(&self) -> String {
        match self {
            AppError::ValidationError { .. } => "ValidationError".to_string(),
            AppError::DatabaseError { .. } => "DatabaseError".to_string(),
            AppError::KeychainError { .. } => "KeychainError".to_string(),
            AppError::ServiceError { .. } => "ServiceError".to_string(),
            AppError::SystemError { .. } => "SystemError".to_string(),
            AppError::IoError { .. } => "IoError".to_string(),
            AppError::InvalidData { .. } => "InvalidData".to_string(),
            AppError::ParseError { .. } => "ParseError".to_string(),
        }
    }
}

/// Result 类型别名
pub type AppResult<T> = Result<T, AppError>;

/// 从 String 转换为 AppError
impl From<String> for AppError {
    fn from(message: String) -> Self {
        AppError::SystemError { message }
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(error: rusqlite::Error) -> Self {
        AppError::DatabaseError {
            message: error.to_string(),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        AppError::ParseError {
            message: error.to_string(),
        }
    }
}
