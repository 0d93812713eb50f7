//! 语言代码规范化
//!
//! 各翻译引擎对同一种语言的叫法并不一致。这里维护一份规范语言代码表，
//! 所有输入先大小写无关地对照规范表校验，再按引擎改写表转换成该引擎
//! 认识的代码。新增某个引擎的特殊写法只需要在 [`ENGINE_ALIASES`] 中加一行。

use crate::translation::core::engine::EngineName;
use crate::translation::error::{TranslationError, TranslationResult};

/// 规范语言代码表
pub const CANONICAL_CODES: &[&str] = &[
    "af", "sq", "am", "ar", "hy", "as", "az", "bn", "bs", "bg", "yue", "ca", "zh", "hr", "cs",
    "da", "prs", "nl", "en", "et", "fj", "fil", "fi", "fr", "de", "el", "gu", "ht", "he", "hi",
    "mww", "hu", "is", "id", "iu", "ga", "it", "ja", "kn", "kk", "km", "tlh", "ko", "ku", "kmr",
    "lo", "lv", "lt", "mg", "ms", "ml", "mt", "mi", "mr", "my", "ne", "nb", "or", "ps", "fa",
    "pl", "pt", "pa", "otq", "ro", "ru", "sm", "sr", "sk", "sl", "es", "sw", "sv", "ty", "ta",
    "te", "th", "ti", "to", "tr", "uk", "ur", "vi", "cy", "yua",
];

/// 引擎改写表：(引擎, 规范代码, 引擎代码)
pub const ENGINE_ALIASES: &[(EngineName, &str, &str)] = &[
    (EngineName::Bing, "zh", "zh-Hans"),
    (EngineName::Sougou, "zh", "zh-CHS"),
    (EngineName::Youdao, "zh", "zh-CHS"),
];

/// 查找规范形式，大小写无关
pub fn canonical(code: &str) -> Option<&'static str> {
    let code = code.trim();
    CANONICAL_CODES
        .iter()
        .copied()
        .find(|candidate| candidate.eq_ignore_ascii_case(code))
}

pub fn is_supported(code: &str) -> bool {
    canonical(code).is_some()
}

pub fn supported_codes() -> &'static [&'static str] {
    CANONICAL_CODES
}

/// 将单个语言代码转换为指定引擎的写法
pub fn engine_code(engine: EngineName, code: &str) -> TranslationResult<&'static str> {
    let canonical =
        canonical(code).ok_or_else(|| TranslationError::UnsupportedLanguage(code.to_string()))?;

    Ok(ENGINE_ALIASES
        .iter()
        .find(|(alias_engine, from, _)| *alias_engine == engine && *from == canonical)
        .map(|(_, _, to)| *to)
        .unwrap_or(canonical))
}

/// 规范化源语言和目标语言
///
/// 先检查源语言，再检查目标语言；任一不在规范表中即返回
/// [`TranslationError::UnsupportedLanguage`]，错误中带有出错的代码。
pub fn normalize(
    engine: EngineName,
    source_lang: &str,
    target_lang: &str,
) -> TranslationResult<(&'static str, &'static str)> {
    let source = engine_code(engine, source_lang)?;
    let target = engine_code(engine, target_lang)?;
    Ok((source, target))
}
