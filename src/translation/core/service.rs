//! 翻译服务
//!
//! [`TranslationService`] 是显式构造的上下文对象，持有冻结的引擎注册表、
//! 会话缓存和共享的 HTTP 客户端。没有任何全局状态。
//!
//! 构造流程由 [`ServiceBuilder`] 完成：注册翻译器，冻结注册表，创建会话
//! 缓存，最后从持久化存储批量载入会话。
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use translax::translation::{TranslationService, TranslaxConfig};
//! # fn example(bing: Arc<dyn translax::translation::Translator>) -> translax::translation::TranslationResult<()> {
//! let service = TranslationService::builder()
//!     .config(TranslaxConfig::default())
//!     .register(bing)
//!     .build()?;
//!
//! let text = service.translate_via("bing", "en", "zh", "hello")?;
//! # Ok(())
//! # }
//! ```

use std::sync::{
    atomic::{AtomicU64, AtomicUsize, Ordering},
    Arc,
};
use std::time::{Duration, Instant};

use reqwest::blocking::Client;

use crate::translation::config::TranslaxConfig;
use crate::translation::core::engine::{EngineName, Translator};
use crate::translation::core::http::EngineClient;
use crate::translation::core::registry::EngineRegistry;
use crate::translation::error::{helpers, TranslationError, TranslationResult};
use crate::translation::language;
use crate::translation::storage::cache::{LoadReport, SessionCache};
use crate::translation::storage::session::Session;
use crate::translation::storage::store::{FileSessionStore, SessionStore};

/// 翻译服务
pub struct TranslationService {
    registry: Arc<EngineRegistry>,
    sessions: Arc<SessionCache>,
    http: Client,
    config: TranslaxConfig,
    stats: ServiceStats,
}

impl TranslationService {
    pub fn builder() -> ServiceBuilder {
        ServiceBuilder::new()
    }

    /// 用指定引擎翻译文本
    ///
    /// 语言代码先按引擎规范化，再交给翻译器；翻译器返回的结果按
    /// `Display` 渲染成字符串。
    pub fn translate(
        &self,
        engine: EngineName,
        source_lang: &str,
        target_lang: &str,
        text: &str,
    ) -> TranslationResult<String> {
        let start = Instant::now();
        self.stats.inc_requests();

        let result = self.dispatch(engine, source_lang, target_lang, text);
        self.stats.add_processing_time(start.elapsed());

        match &result {
            Ok(_) => {
                self.stats.inc_translations_completed();
                self.stats.add_chars_processed(text.chars().count());
            }
            Err(e) => {
                self.stats.inc_errors();
                helpers::log(e);
            }
        }
        result
    }

    /// 按引擎名称翻译，名称不在已知引擎之列时返回 `EngineNotSelected`
    pub fn translate_via(
        &self,
        engine: &str,
        source_lang: &str,
        target_lang: &str,
        text: &str,
    ) -> TranslationResult<String> {
        let engine: EngineName = engine.parse()?;
        self.translate(engine, source_lang, target_lang, text)
    }

    fn dispatch(
        &self,
        engine: EngineName,
        source_lang: &str,
        target_lang: &str,
        text: &str,
    ) -> TranslationResult<String> {
        let translator = self
            .registry
            .resolve(engine)
            .ok_or_else(|| TranslationError::UnknownEngine(engine.to_string()))?;

        let (source, target) = language::normalize(engine, source_lang, target_lang)?;
        tracing::debug!("{} 翻译 {} -> {}，{} 个字符", engine, source, target, text.len());

        let client = EngineClient::new(engine, &self.http, &self.sessions, &self.config.user_agent);
        let output = translator.translate(&client, source, target, text)?;
        Ok(output.to_string())
    }

    /// 引擎当前的有效会话，必要时刷新
    pub fn session(&self, engine: EngineName) -> TranslationResult<Arc<Session>> {
        self.sessions.get_session(engine)
    }

    pub fn sessions(&self) -> &Arc<SessionCache> {
        &self.sessions
    }

    pub fn registry(&self) -> &Arc<EngineRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &TranslaxConfig {
        &self.config
    }

    pub fn stats(&self) -> ServiceStatsSnapshot {
        self.stats.snapshot()
    }
}

/// 服务构造器
pub struct ServiceBuilder {
    config: TranslaxConfig,
    registry: EngineRegistry,
    store: Option<Arc<dyn SessionStore>>,
}

impl Default for ServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceBuilder {
    pub fn new() -> Self {
        Self {
            config: TranslaxConfig::default(),
            registry: EngineRegistry::new(),
            store: None,
        }
    }

    pub fn config(mut self, config: TranslaxConfig) -> Self {
        self.config = config;
        self
    }

    /// 注册翻译器，同一引擎后注册的覆盖先注册的
    pub fn register(mut self, translator: Arc<dyn Translator>) -> Self {
        self.registry.register(translator);
        self
    }

    /// 替换默认的文件会话存储
    pub fn session_store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn build(self) -> TranslationResult<TranslationService> {
        self.build_with_report().map(|(service, _)| service)
    }

    /// 构造服务，同时返回启动时批量载入会话的结果
    pub fn build_with_report(self) -> TranslationResult<(TranslationService, LoadReport)> {
        let config = self.config;
        config.validate()?;

        let store: Arc<dyn SessionStore> = match self.store {
            Some(store) => store,
            None => {
                let store = FileSessionStore::from_config(&config)?;
                tracing::info!("会话目录: {}", store.dir().display());
                Arc::new(store)
            }
        };

        let http = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| helpers::config_error(format!("HTTP 客户端创建失败: {}", e)))?;

        let registry = Arc::new(self.registry);
        let sessions = Arc::new(
            SessionCache::new(Arc::clone(&registry), store)
                .with_expiry_check(config.check_session_expiry),
        );
        let report = sessions.load_all();

        tracing::info!("翻译服务已就绪，注册了 {} 个引擎", registry.len());
        Ok((
            TranslationService {
                registry,
                sessions,
                http,
                config,
                stats: ServiceStats::default(),
            },
            report,
        ))
    }
}

/// 服务统计信息
#[derive(Debug, Default)]
pub struct ServiceStats {
    pub requests: AtomicUsize,
    pub translations_completed: AtomicUsize,
    pub errors_encountered: AtomicUsize,
    /// 总处理时间，微秒
    pub processing_time: AtomicU64,
    pub total_chars_processed: AtomicUsize,
}

impl ServiceStats {
    pub fn inc_requests(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_translations_completed(&self) {
        self.translations_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_errors(&self) {
        self.errors_encountered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_processing_time(&self, duration: Duration) {
        self.processing_time
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
    }

    pub fn add_chars_processed(&self, count: usize) {
        self.total_chars_processed.fetch_add(count, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> ServiceStatsSnapshot {
        ServiceStatsSnapshot {
            requests: self.requests.load(Ordering::Relaxed),
            translations_completed: self.translations_completed.load(Ordering::Relaxed),
            errors_encountered: self.errors_encountered.load(Ordering::Relaxed),
            processing_time: Duration::from_micros(self.processing_time.load(Ordering::Relaxed)),
            total_chars_processed: self.total_chars_processed.load(Ordering::Relaxed),
        }
    }
}

/// 统计数据快照
#[derive(Debug, Clone, Copy)]
pub struct ServiceStatsSnapshot {
    pub requests: usize,
    pub translations_completed: usize,
    pub errors_encountered: usize,
    pub processing_time: Duration,
    pub total_chars_processed: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translation::core::engine::TranslationOutput;
    use crate::translation::storage::session::Cookie;
    use crate::translation::storage::store::MemorySessionStore;

    /// 把规范化后的语言代码回显出来，不发网络请求
    struct Echo(EngineName);

    impl Translator for Echo {
        fn engine(&self) -> EngineName {
            self.0
        }

        fn acquire_session(&self) -> TranslationResult<Session> {
            Ok(Session::new(0, vec![Cookie::new("sid", "echo")]))
        }

        fn translate(
            &self,
            client: &EngineClient<'_>,
            source_lang: &str,
            target_lang: &str,
            text: &str,
        ) -> TranslationResult<TranslationOutput> {
            let session = client.session()?;
            Ok(Box::new(format!(
                "[{}>{}|{}] {}",
                source_lang,
                target_lang,
                session.cookies.len(),
                text
            )))
        }
    }

    fn service_with(engines: &[EngineName]) -> TranslationService {
        let mut builder =
            TranslationService::builder().session_store(Arc::new(MemorySessionStore::new()));
        for engine in engines {
            builder = builder.register(Arc::new(Echo(*engine)));
        }
        builder.build().unwrap()
    }

    #[test]
    fn test_dispatch_normalizes_languages() {
        let service = service_with(&[EngineName::Bing, EngineName::Youdao]);

        assert_eq!(
            service.translate(EngineName::Bing, "EN", "zh", "hi").unwrap(),
            "[en>zh-Hans|1] hi"
        );
        assert_eq!(
            service.translate_via("youdao", "zh", "ja", "你好").unwrap(),
            "[zh-CHS>ja|1] 你好"
        );

        let stats = service.stats();
        assert_eq!(stats.requests, 2);
        assert_eq!(stats.translations_completed, 2);
        assert_eq!(stats.total_chars_processed, 4);
    }

    #[test]
    fn test_unknown_and_unselected_engines() {
        let service = service_with(&[EngineName::Google]);

        let err = service.translate(EngineName::Baidu, "en", "zh", "hi").unwrap_err();
        assert!(matches!(err, TranslationError::UnknownEngine(ref name) if name == "baidu"));

        let err = service.translate_via("deepl", "en", "zh", "hi").unwrap_err();
        assert!(matches!(err, TranslationError::EngineNotSelected(ref name) if name == "deepl"));

        assert_eq!(service.stats().errors_encountered, 1);
    }

    #[test]
    fn test_unsupported_language_surfaces_verbatim() {
        let service = service_with(&[EngineName::Google]);

        let err = service.translate(EngineName::Google, "en", "xx", "hi").unwrap_err();
        assert!(matches!(err, TranslationError::UnsupportedLanguage(ref code) if code == "xx"));
        assert!(service.sessions().is_empty());
    }

    #[test]
    fn test_session_accessor_shares_cache() {
        let service = service_with(&[EngineName::Sougou]);
        let first = service.session(EngineName::Sougou).unwrap();
        let second = service.sessions().get_session(EngineName::Sougou).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(service.registry().contains(EngineName::Sougou));
    }

    #[test]
    fn test_build_rejects_invalid_config() {
        let mut config = TranslaxConfig::default();
        config.request_timeout_secs = 0;

        let result = TranslationService::builder()
            .config(config)
            .session_store(Arc::new(MemorySessionStore::new()))
            .build();
        assert!(matches!(result, Err(TranslationError::ConfigError(_))));
    }
}
