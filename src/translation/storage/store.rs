//! 会话持久化
//!
//! 每个引擎一条持久化记录。[`FileSessionStore`] 把会话写成
//! `<dir>/<engine>.yaml`，写入时先落到同目录下的临时文件，`sync` 之后再
//! `rename` 覆盖目标文件，读者只会看到旧文件或新文件。

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use dashmap::DashMap;
use tempfile::Builder;

use crate::translation::config::TranslaxConfig;
use crate::translation::core::engine::EngineName;
use crate::translation::error::{helpers, TranslationError, TranslationResult};
use crate::translation::storage::session::Session;

/// 会话存储后端
pub trait SessionStore: Send + Sync {
    /// 读取引擎的会话
    ///
    /// 记录不存在时返回 [`TranslationError::SessionNotFound`]，
    /// 无法解析时返回 [`TranslationError::CorruptSession`]。
    fn load(&self, engine: EngineName) -> TranslationResult<Session>;

    /// 保存引擎的会话，`None` 会被拒绝且不写入任何内容
    fn save(&self, engine: EngineName, session: Option<&Session>) -> TranslationResult<()>;
}

fn require_session(engine: EngineName, session: Option<&Session>) -> TranslationResult<&Session> {
    session.ok_or_else(|| helpers::validation_error(format!("引擎 {} 的会话不能为空", engine)))
}

/// 基于 YAML 文件的会话存储
pub struct FileSessionStore {
    dir: PathBuf,
    write_locks: DashMap<EngineName, Arc<Mutex<()>>>,
}

impl FileSessionStore {
    pub const EXTENSION: &'static str = "yaml";

    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_locks: DashMap::new(),
        }
    }

    /// 使用配置中解析出的会话目录
    pub fn from_config(config: &TranslaxConfig) -> TranslationResult<Self> {
        Ok(Self::new(config.session_dir()?))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, engine: EngineName) -> PathBuf {
        self.dir.join(format!("{}.{}", engine, Self::EXTENSION))
    }

    fn write_lock(&self, engine: EngineName) -> Arc<Mutex<()>> {
        self.write_locks
            .entry(engine)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// 先写入同目录下名字唯一的临时文件，`sync` 后再改名覆盖目标文件
    ///
    /// 临时文件名带随机后缀，指向同一目录的多个存储实例（包括其他进程）
    /// 不会互相覆盖对方的临时文件。
    fn write_atomically(&self, engine: EngineName, path: &Path, content: &[u8]) -> TranslationResult<()> {
        let io_error = |e: std::io::Error| {
            TranslationError::IoError(format!("写入会话文件 {} 失败: {}", path.display(), e))
        };

        let mut temp = Builder::new()
            .prefix(&format!("{}.", engine))
            .suffix(&format!(".{}.tmp", Self::EXTENSION))
            .tempfile_in(&self.dir)
            .map_err(io_error)?;

        temp.write_all(content)
            .and_then(|_| temp.as_file().sync_all())
            .map_err(io_error)?;

        // 失败时临时文件随 PersistError 一起被清理
        temp.persist(path).map_err(|e| io_error(e.error))?;
        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self, engine: EngineName) -> TranslationResult<Session> {
        let path = self.path_for(engine);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(TranslationError::SessionNotFound(engine))
            }
            Err(e) => {
                return Err(TranslationError::IoError(format!(
                    "读取会话文件 {} 失败: {}",
                    path.display(),
                    e
                )))
            }
        };

        serde_yaml::from_str(&content).map_err(|e| TranslationError::CorruptSession {
            engine,
            reason: e.to_string(),
        })
    }

    fn save(&self, engine: EngineName, session: Option<&Session>) -> TranslationResult<()> {
        let session = require_session(engine, session)?;
        let content = serde_yaml::to_string(session)?;

        let lock = self.write_lock(engine);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        fs::create_dir_all(&self.dir)
            .map_err(|e| TranslationError::IoError(format!("缓存目录创建失败: {}", e)))?;

        let path = self.path_for(engine);
        self.write_atomically(engine, &path, content.as_bytes())?;

        tracing::debug!("已保存 {} 会话到 {}", engine, path.display());
        Ok(())
    }
}

/// 内存会话存储，不落盘
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: DashMap<EngineName, Session>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self, engine: EngineName) -> TranslationResult<Session> {
        self.sessions
            .get(&engine)
            .map(|entry| entry.value().clone())
            .ok_or(TranslationError::SessionNotFound(engine))
    }

    fn save(&self, engine: EngineName, session: Option<&Session>) -> TranslationResult<()> {
        let session = require_session(engine, session)?;
        self.sessions.insert(engine, session.clone());
        Ok(())
    }
}
