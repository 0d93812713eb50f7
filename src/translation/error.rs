//! 翻译模块统一错误处理
//!
//! 提供结构化错误类型和错误处理机制。除会话持久化失败和启动时批量加载失败
//! 会被记录后吞掉之外，其余错误原样传播给直接调用者。

use std::fmt;

use thiserror::Error;

use crate::translation::core::engine::EngineName;

/// 翻译错误类型
#[derive(Error, Debug, Clone)]
pub enum TranslationError {
    /// 注册表中没有该引擎
    #[error("未知的翻译引擎: {0}")]
    UnknownEngine(String),

    /// 引擎名称不属于受支持的引擎集合
    #[error("未选择翻译引擎: {0}")]
    EngineNotSelected(String),

    /// 语言代码不在规范语言表中
    #[error("不支持的语言代码: {0}")]
    UnsupportedLanguage(String),

    /// 会话缓存找不到对应的翻译器
    #[error("引擎 {0} 没有注册翻译器")]
    NoTranslator(EngineName),

    /// 会话获取失败
    #[error("引擎 {engine} 会话刷新失败: {reason}")]
    RefreshFailed { engine: EngineName, reason: String },

    /// 持久化存储中没有该引擎的会话
    #[error("引擎 {0} 没有已保存的会话")]
    SessionNotFound(EngineName),

    /// 会话文件无法解析
    #[error("引擎 {engine} 的会话文件已损坏: {reason}")]
    CorruptSession { engine: EngineName, reason: String },

    /// 文件读写错误
    #[error("IO错误: {0}")]
    IoError(String),

    /// 序列化错误
    #[error("序列化错误: {0}")]
    SerializationError(String),

    /// 输入验证错误
    #[error("输入无效: {0}")]
    InvalidInput(String),

    /// 网络错误
    #[error("网络错误: {0}")]
    NetworkError(String),

    /// 上游翻译服务返回错误
    #[error("上游服务错误: {0}")]
    UpstreamError(String),

    /// 配置错误
    #[error("配置错误: {0}")]
    ConfigError(String),
}

impl TranslationError {
    /// 获取错误的严重程度
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            TranslationError::UnknownEngine(_) => ErrorSeverity::Error,
            TranslationError::EngineNotSelected(_) => ErrorSeverity::Info,
            TranslationError::UnsupportedLanguage(_) => ErrorSeverity::Info,
            TranslationError::NoTranslator(_) => ErrorSeverity::Error,
            TranslationError::RefreshFailed { .. } => ErrorSeverity::Error,
            TranslationError::SessionNotFound(_) => ErrorSeverity::Info,
            TranslationError::CorruptSession { .. } => ErrorSeverity::Warning,
            TranslationError::IoError(_) => ErrorSeverity::Warning,
            TranslationError::SerializationError(_) => ErrorSeverity::Error,
            TranslationError::InvalidInput(_) => ErrorSeverity::Info,
            TranslationError::NetworkError(_) => ErrorSeverity::Warning,
            TranslationError::UpstreamError(_) => ErrorSeverity::Error,
            TranslationError::ConfigError(_) => ErrorSeverity::Critical,
        }
    }

    /// 获取错误类别
    pub fn category(&self) -> ErrorCategory {
        match self {
            TranslationError::UnknownEngine(_)
            | TranslationError::EngineNotSelected(_)
            | TranslationError::NoTranslator(_) => ErrorCategory::Engine,
            TranslationError::UnsupportedLanguage(_) | TranslationError::InvalidInput(_) => {
                ErrorCategory::Input
            }
            TranslationError::RefreshFailed { .. } => ErrorCategory::Session,
            TranslationError::SessionNotFound(_)
            | TranslationError::CorruptSession { .. }
            | TranslationError::IoError(_) => ErrorCategory::Storage,
            TranslationError::SerializationError(_) => ErrorCategory::Serialization,
            TranslationError::NetworkError(_) => ErrorCategory::Network,
            TranslationError::UpstreamError(_) => ErrorCategory::Service,
            TranslationError::ConfigError(_) => ErrorCategory::Configuration,
        }
    }

    /// 缺失的会话文件不算真正的故障
    pub fn is_not_found(&self) -> bool {
        matches!(self, TranslationError::SessionNotFound(_))
    }
}

/// 错误严重程度
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

/// 错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Configuration,
    Engine,
    Input,
    Session,
    Storage,
    Serialization,
    Network,
    Service,
}

/// 标准错误转换
impl From<std::io::Error> for TranslationError {
    fn from(error: std::io::Error) -> Self {
        TranslationError::IoError(error.to_string())
    }
}

impl From<serde_yaml::Error> for TranslationError {
    fn from(error: serde_yaml::Error) -> Self {
        TranslationError::SerializationError(format!("YAML序列化错误: {}", error))
    }
}

impl From<serde_json::Error> for TranslationError {
    fn from(error: serde_json::Error) -> Self {
        TranslationError::SerializationError(format!("JSON序列化错误: {}", error))
    }
}

impl From<toml::de::Error> for TranslationError {
    fn from(error: toml::de::Error) -> Self {
        TranslationError::ConfigError(format!("TOML解析错误: {}", error))
    }
}

impl From<reqwest::Error> for TranslationError {
    fn from(error: reqwest::Error) -> Self {
        match error.status() {
            Some(status) => TranslationError::UpstreamError(format!("HTTP {}: {}", status, error)),
            None => TranslationError::NetworkError(error.to_string()),
        }
    }
}

/// 错误结果类型别名
pub type TranslationResult<T> = Result<T, TranslationError>;

/// 错误处理助手函数
pub mod helpers {
    use super::*;

    /// 按严重程度记录错误
    pub fn log(error: &TranslationError) {
        match error.severity() {
            ErrorSeverity::Info => tracing::info!("翻译信息: {}", error),
            ErrorSeverity::Warning => tracing::warn!("翻译警告: {}", error),
            ErrorSeverity::Error => tracing::error!("翻译错误: {}", error),
            ErrorSeverity::Critical => tracing::error!("翻译严重错误: {}", error),
        }
    }

    /// 记录并返回错误
    pub fn log_error<T>(error: TranslationError) -> TranslationResult<T> {
        log(&error);
        Err(error)
    }

    /// 创建输入验证错误
    pub fn validation_error<T: fmt::Display>(msg: T) -> TranslationError {
        TranslationError::InvalidInput(msg.to_string())
    }

    /// 创建配置错误
    pub fn config_error<T: fmt::Display>(msg: T) -> TranslationError {
        TranslationError::ConfigError(msg.to_string())
    }

    /// 创建会话刷新错误
    pub fn refresh_error<T: fmt::Display>(engine: EngineName, reason: T) -> TranslationError {
        TranslationError::RefreshFailed {
            engine,
            reason: reason.to_string(),
        }
    }
}
