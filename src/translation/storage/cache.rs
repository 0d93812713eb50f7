//! 会话缓存
//!
//! 内存中的会话缓存是每个引擎当前会话的唯一权威来源，持久化存储只是它的
//! 被动镜像。所有出站的引擎请求都经由 [`SessionCache::get_session`] 取得
//! Cookie：
//!
//! 1. 内存中有可用会话时直接返回同一个 `Arc`
//! 2. 否则通过注册表找到该引擎的翻译器，找不到返回 `NoTranslator`
//! 3. 获取该引擎的刷新锁后再检查一次缓存，仍未命中才调用
//!    `acquire_session`，成功后写入内存并尽力持久化
//!
//! 持久化失败只记录日志，刷新得到的会话在本进程内照常可用。刷新失败时
//! 不缓存任何内容，也不会自动重试。

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Mutex, PoisonError,
};

use chrono::Utc;
use dashmap::DashMap;

use crate::translation::core::engine::EngineName;
use crate::translation::core::registry::EngineRegistry;
use crate::translation::error::{helpers, TranslationError, TranslationResult};
use crate::translation::storage::session::Session;
use crate::translation::storage::store::SessionStore;

/// 批量加载结果
#[derive(Debug, Default)]
pub struct LoadReport {
    /// 成功载入的引擎
    pub loaded: Vec<EngineName>,
    /// 载入失败的引擎及原因（包括没有会话文件）
    pub skipped: Vec<(EngineName, TranslationError)>,
}

impl LoadReport {
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// 缓存统计信息
#[derive(Debug, Default)]
pub struct SessionCacheStats {
    pub hits: AtomicU64,
    pub misses: AtomicU64,
    pub refreshes: AtomicU64,
    pub refresh_failures: AtomicU64,
    pub persist_failures: AtomicU64,
    pub expired: AtomicU64,
}

/// 统计信息快照
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionCacheStatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub refreshes: u64,
    pub refresh_failures: u64,
    pub persist_failures: u64,
    pub expired: u64,
}

impl SessionCacheStats {
    fn inc(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> SessionCacheStatsSnapshot {
        SessionCacheStatsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            refreshes: self.refreshes.load(Ordering::Relaxed),
            refresh_failures: self.refresh_failures.load(Ordering::Relaxed),
            persist_failures: self.persist_failures.load(Ordering::Relaxed),
            expired: self.expired.load(Ordering::Relaxed),
        }
    }
}

impl SessionCacheStatsSnapshot {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// 会话缓存
pub struct SessionCache {
    sessions: DashMap<EngineName, Arc<Session>>,
    refresh_locks: DashMap<EngineName, Arc<Mutex<()>>>,
    registry: Arc<EngineRegistry>,
    store: Arc<dyn SessionStore>,
    check_expiry: bool,
    stats: SessionCacheStats,
}

impl SessionCache {
    pub fn new(registry: Arc<EngineRegistry>, store: Arc<dyn SessionStore>) -> Self {
        Self {
            sessions: DashMap::new(),
            refresh_locks: DashMap::new(),
            registry,
            store,
            check_expiry: true,
            stats: SessionCacheStats::default(),
        }
    }

    /// 是否在命中时检查会话的过期时间，默认开启
    pub fn with_expiry_check(mut self, enabled: bool) -> Self {
        self.check_expiry = enabled;
        self
    }

    /// 从持久化存储载入所有已注册引擎的会话
    ///
    /// 单个引擎失败只记录日志，不影响其他引擎。
    pub fn load_all(&self) -> LoadReport {
        let mut report = LoadReport::default();

        for engine in self.registry.engines() {
            match self.store.load(engine) {
                Ok(session) => {
                    self.sessions.insert(engine, Arc::new(session));
                    report.loaded.push(engine);
                }
                Err(e) => {
                    if e.is_not_found() {
                        tracing::debug!("引擎 {} 没有已保存的会话", engine);
                    } else {
                        tracing::warn!("载入引擎 {} 会话失败，已忽略: {}", engine, e);
                    }
                    report.skipped.push((engine, e));
                }
            }
        }

        tracing::info!(
            "已载入 {} 个会话，跳过 {} 个",
            report.loaded.len(),
            report.skipped.len()
        );
        report
    }

    /// 获取引擎的有效会话，必要时刷新
    pub fn get_session(&self, engine: EngineName) -> TranslationResult<Arc<Session>> {
        match self.peek(engine) {
            Some(session) if !self.is_stale(&session) => {
                SessionCacheStats::inc(&self.stats.hits);
                tracing::debug!("会话缓存命中: {}", engine);
                return Ok(session);
            }
            Some(_) => {
                SessionCacheStats::inc(&self.stats.expired);
                tracing::debug!("引擎 {} 的缓存会话已过期", engine);
            }
            None => {}
        }

        let Some(translator) = self.registry.resolve(engine) else {
            SessionCacheStats::inc(&self.stats.misses);
            return Err(TranslationError::NoTranslator(engine));
        };

        let lock = self.refresh_lock(engine);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        // 等锁期间其他调用者可能已经完成刷新，每次调用只计一次命中或未命中
        if let Some(session) = self.peek(engine).filter(|s| !self.is_stale(s)) {
            SessionCacheStats::inc(&self.stats.hits);
            tracing::debug!("会话缓存命中（等待刷新后）: {}", engine);
            return Ok(session);
        }
        SessionCacheStats::inc(&self.stats.misses);

        tracing::info!("刷新引擎 {} 的会话", engine);
        let session = match translator.acquire_session() {
            Ok(session) => Arc::new(session),
            Err(e) => {
                SessionCacheStats::inc(&self.stats.refresh_failures);
                return helpers::log_error(helpers::refresh_error(engine, e));
            }
        };
        SessionCacheStats::inc(&self.stats.refreshes);

        self.sessions.insert(engine, Arc::clone(&session));
        self.persist(engine, &session);

        Ok(session)
    }

    /// 用外部获得的新会话替换缓存项，并尽力持久化
    pub fn insert(&self, engine: EngineName, session: Session) -> Arc<Session> {
        let session = Arc::new(session);
        let lock = self.refresh_lock(engine);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        self.sessions.insert(engine, Arc::clone(&session));
        self.persist(engine, &session);
        session
    }

    /// 查看缓存项，不触发刷新也不检查过期
    pub fn peek(&self, engine: EngineName) -> Option<Arc<Session>> {
        self.sessions.get(&engine).map(|entry| Arc::clone(entry.value()))
    }

    pub fn engines(&self) -> Vec<EngineName> {
        let mut engines: Vec<_> = self.sessions.iter().map(|entry| *entry.key()).collect();
        engines.sort();
        engines
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn stats(&self) -> SessionCacheStatsSnapshot {
        self.stats.snapshot()
    }

    fn is_stale(&self, session: &Session) -> bool {
        self.check_expiry && session.is_expired_at(Utc::now().timestamp())
    }

    fn refresh_lock(&self, engine: EngineName) -> Arc<Mutex<()>> {
        self.refresh_locks
            .entry(engine)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    fn persist(&self, engine: EngineName, session: &Session) {
        if let Err(e) = self.store.save(engine, Some(session)) {
            SessionCacheStats::inc(&self.stats.persist_failures);
            tracing::warn!("持久化引擎 {} 会话失败，仅保留内存副本: {}", engine, e);
        }
    }
}
