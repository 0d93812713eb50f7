//! 会话存储
//!
//! 内存缓存（`cache`）是会话的权威来源，持久化存储（`store`）只是镜像。

pub mod cache;
pub mod session;
pub mod store;

pub use cache::{LoadReport, SessionCache, SessionCacheStats, SessionCacheStatsSnapshot};
pub use session::{Cookie, Session};
pub use store::{FileSessionStore, MemorySessionStore, SessionStore};
