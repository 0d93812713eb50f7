//! # translaX
//!
//! 多引擎网页翻译客户端的核心：按引擎名称分发翻译请求，缓存并持久化每个
//! 引擎的会话，统一各引擎的语言代码写法。
//!
//! ## 模块组织
//!
//! - `translation` - 引擎接口、会话缓存、语言代码和翻译服务
//! - `env` - 类型化的环境变量
//! - `logging` - tracing 日志初始化

pub mod env;
pub mod logging;
pub mod translation;

pub use translation::{
    EngineName, Session, TranslationError, TranslationResult, TranslationService, Translator,
};
