//! 翻译核心
//!
//! - **engine**: 引擎标识和翻译器能力接口
//! - **registry**: 引擎注册表
//! - **http**: 翻译器使用的出站请求原语，自动附带会话 Cookie
//! - **service**: 对外的翻译服务，负责分发请求
//!
//! ```text
//! TranslationService (service.rs)
//!     ├── EngineRegistry (registry.rs) ──> dyn Translator (engine.rs)
//!     ├── language::normalize
//!     └── EngineClient (http.rs)
//!             └── SessionCache (storage/cache.rs)
//!                     └── SessionStore (storage/store.rs)
//! ```

pub mod engine;
pub mod http;
pub mod registry;
pub mod service;

pub use engine::{EngineName, TranslationOutput, Translator};
pub use http::{ensure_success, EngineClient};
pub use registry::EngineRegistry;
pub use service::{ServiceBuilder, ServiceStats, ServiceStatsSnapshot, TranslationService};
