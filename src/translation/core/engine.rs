//! 翻译引擎标识与能力接口
//!
//! 每个第三方翻译后端都以 [`EngineName`] 标识，并通过实现 [`Translator`]
//! 接入核心。核心只依赖这三个方法：
//!
//! - `engine()`: 声明自身的引擎标识，注册表以此为键
//! - `acquire_session()`: 从零获取一个新的会话（Cookie + 过期时间）
//! - `translate()`: 执行一次翻译，出站请求通过 [`EngineClient`] 发送，
//!   由它向会话缓存索取 Cookie
//!
//! 请求体的构造和响应的解析属于各引擎自己的实现，核心不关心。

use std::fmt;
use std::str::FromStr;

use crate::translation::core::http::EngineClient;
use crate::translation::error::{TranslationError, TranslationResult};
use crate::translation::storage::session::Session;

/// 受支持的翻译引擎
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EngineName {
    Baidu,
    Sougou,
    Youdao,
    Bing,
    Google,
}

impl EngineName {
    /// 所有引擎，顺序固定
    pub const ALL: [EngineName; 5] = [
        EngineName::Baidu,
        EngineName::Sougou,
        EngineName::Youdao,
        EngineName::Bing,
        EngineName::Google,
    ];

    /// 引擎的小写名称，同时也是会话文件名
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineName::Baidu => "baidu",
            EngineName::Sougou => "sougou",
            EngineName::Youdao => "youdao",
            EngineName::Bing => "bing",
            EngineName::Google => "google",
        }
    }
}

impl fmt::Display for EngineName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EngineName {
    type Err = TranslationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_lowercase();
        EngineName::ALL
            .into_iter()
            .find(|engine| engine.as_str() == name)
            .ok_or_else(|| TranslationError::EngineNotSelected(s.to_string()))
    }
}

/// 翻译结果
///
/// 核心把它当作黑盒，只通过 `Display` 渲染成字符串交给调用者。
pub type TranslationOutput = Box<dyn fmt::Display + Send + Sync>;

/// 单个翻译引擎的能力接口
pub trait Translator: Send + Sync {
    /// 引擎标识
    fn engine(&self) -> EngineName;

    /// 获取一个全新的会话
    ///
    /// 只会在缓存未命中（或缓存中的会话已过期）时被调用，并且同一引擎
    /// 同一时刻最多只有一次调用在进行。实现中不应再通过 [`EngineClient`]
    /// 的带 Cookie 请求访问会话缓存。
    fn acquire_session(&self) -> TranslationResult<Session>;

    /// 翻译文本
    ///
    /// `source_lang` 和 `target_lang` 已经过规范化并改写为该引擎的方言。
    fn translate(
        &self,
        client: &EngineClient<'_>,
        source_lang: &str,
        target_lang: &str,
        text: &str,
    ) -> TranslationResult<TranslationOutput>;
}
