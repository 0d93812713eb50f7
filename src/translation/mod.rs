//! 翻译模块
//!
//! 把翻译请求分发到多个第三方网页翻译引擎，并为每个引擎管理会话状态
//! （Cookie 和过期时间）：
//! - **core**: 引擎接口、注册表、出站请求原语和翻译服务
//! - **storage**: 会话缓存与持久化
//! - **language**: 语言代码规范化
//! - **config**: 配置管理
//! - **error**: 错误处理

/// 配置管理模块
pub mod config;

/// 核心翻译模块
pub mod core;

/// 错误处理模块
pub mod error;

/// 语言代码表
pub mod language;

/// 会话存储模块
pub mod storage;

pub use config::{ConfigManager, TranslaxConfig};
pub use self::core::{
    EngineClient, EngineName, EngineRegistry, ServiceBuilder, TranslationOutput,
    TranslationService, Translator,
};
pub use error::{TranslationError, TranslationResult};
pub use storage::{Cookie, FileSessionStore, MemorySessionStore, Session, SessionCache, SessionStore};
