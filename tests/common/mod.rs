// 集成测试公共模块
//
// 提供替身翻译器、临时会话目录等共享工具

use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tempfile::TempDir;

use translax::translation::core::engine::{EngineName, TranslationOutput, Translator};
use translax::translation::core::http::EngineClient;
use translax::translation::error::{TranslationError, TranslationResult};
use translax::translation::storage::session::{Cookie, Session};
use translax::translation::storage::store::FileSessionStore;

/// 替身翻译器
///
/// `acquire_session` 返回预设的 Cookie 并计数；`translate` 只向会话缓存
/// 索取会话，不发网络请求。
#[allow(dead_code)]
pub struct StubTranslator {
    pub engine: EngineName,
    pub cookies: Vec<Cookie>,
    pub expires_at: i64,
    pub delay: Duration,
    pub fail_with: Option<TranslationError>,
    pub acquire_calls: AtomicUsize,
    pub translate_calls: AtomicUsize,
}

#[allow(dead_code)]
impl StubTranslator {
    pub fn new(engine: EngineName) -> Self {
        Self {
            engine,
            cookies: vec![Cookie::new("sid", engine.as_str())],
            expires_at: 0,
            delay: Duration::ZERO,
            fail_with: None,
            acquire_calls: AtomicUsize::new(0),
            translate_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_cookies(mut self, cookies: Vec<Cookie>) -> Self {
        self.cookies = cookies;
        self
    }

    pub fn with_expiry(mut self, expires_at: i64) -> Self {
        self.expires_at = expires_at;
        self
    }

    /// 让 `acquire_session` 变慢，放大并发窗口
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn failing(mut self, error: TranslationError) -> Self {
        self.fail_with = Some(error);
        self
    }

    pub fn acquire_count(&self) -> usize {
        self.acquire_calls.load(Ordering::SeqCst)
    }

    pub fn translate_count(&self) -> usize {
        self.translate_calls.load(Ordering::SeqCst)
    }
}

impl Translator for StubTranslator {
    fn engine(&self) -> EngineName {
        self.engine
    }

    fn acquire_session(&self) -> TranslationResult<Session> {
        self.acquire_calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
        match &self.fail_with {
            Some(error) => Err(error.clone()),
            None => Ok(Session::new(self.expires_at, self.cookies.clone())),
        }
    }

    fn translate(
        &self,
        client: &EngineClient<'_>,
        source_lang: &str,
        target_lang: &str,
        text: &str,
    ) -> TranslationResult<TranslationOutput> {
        self.translate_calls.fetch_add(1, Ordering::SeqCst);
        let session = client.session()?;
        let cookies = session.cookie_header().unwrap_or_default();
        Ok(Box::new(format!(
            "{}:{}->{}:{}:{}",
            self.engine, source_lang, target_lang, cookies, text
        )))
    }
}

/// 带临时会话目录的测试环境
#[allow(dead_code)]
pub struct TestEnvironment {
    pub temp_dir: TempDir,
}

#[allow(dead_code)]
impl TestEnvironment {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    pub fn session_dir(&self) -> PathBuf {
        self.temp_dir.path().join("translaX")
    }

    pub fn store(&self) -> Arc<FileSessionStore> {
        Arc::new(FileSessionStore::new(self.session_dir()))
    }

    /// 直接写入会话文件内容，绕过存储层
    pub fn write_raw(&self, engine: EngineName, content: &str) {
        let dir = self.session_dir();
        fs::create_dir_all(&dir).expect("Failed to create session dir");
        fs::write(dir.join(format!("{}.yaml", engine)), content)
            .expect("Failed to write session file");
    }

    pub fn file_exists(&self, engine: EngineName) -> bool {
        self.session_dir().join(format!("{}.yaml", engine)).exists()
    }
}

/// 会话样本
#[allow(dead_code)]
pub fn two_cookie_session() -> Session {
    Session::new(
        1_900_000_000,
        vec![
            Cookie::parse_set_cookie("BAIDUID=abc; path=/; domain=.baidu.com")
                .expect("valid Set-Cookie line"),
            Cookie::new("BIDUPSID", "def"),
        ],
    )
}
