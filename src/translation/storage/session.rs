//! 会话值对象
//!
//! 一个会话就是调用某个引擎所需的 Cookie 集合加上过期时间。磁盘上的格式
//! 固定为两个字段：`expr_at`（Unix 秒）和有序的 `cookies` 列表，每条 Cookie
//! 至少包含 `name`、`value` 和原始的 `raw` 头部文本。

use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// 单条 Cookie
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    /// 服务器下发时的原始 `Set-Cookie` 文本
    #[serde(default)]
    pub raw: String,
}

impl Cookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        let raw = format!("{}={}", name, value);
        Self { name, value, raw }
    }

    /// 从一行 `Set-Cookie` 头解析 Cookie
    ///
    /// 只取第一个 `name=value` 对，属性部分（Path、Domain 等）保留在 `raw` 中。
    pub fn parse_set_cookie(header: &str) -> Option<Self> {
        let header = header.trim();
        let pair = header.split(';').next()?.trim();
        let (name, value) = pair.split_once('=')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        Some(Self {
            name: name.to_string(),
            value: value.trim().trim_matches('"').to_string(),
            raw: header.to_string(),
        })
    }

    /// `name=value` 形式，用于拼接 `Cookie` 请求头
    pub fn pair(&self) -> String {
        format!("{}={}", self.name, self.value)
    }
}

/// 引擎会话
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// 过期时间（Unix 秒），小于等于 0 表示不过期
    #[serde(rename = "expr_at", default)]
    pub expires_at: i64,
    #[serde(default)]
    pub cookies: Vec<Cookie>,
}

impl Session {
    pub fn new(expires_at: i64, cookies: Vec<Cookie>) -> Self {
        Self {
            expires_at,
            cookies,
        }
    }

    /// 从现在起 `ttl` 后过期的会话
    pub fn with_ttl(ttl: Duration, cookies: Vec<Cookie>) -> Self {
        let ttl = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        Self::new(Utc::now().timestamp().saturating_add(ttl), cookies)
    }

    /// 从引擎首页返回的 `Set-Cookie` 头构造会话，无法解析的行会被跳过
    pub fn from_set_cookie_headers<I, S>(headers: I, ttl: Duration) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let cookies = headers
            .into_iter()
            .filter_map(|header| Cookie::parse_set_cookie(header.as_ref()))
            .collect();
        Self::with_ttl(ttl, cookies)
    }

    pub fn is_expired_at(&self, now: i64) -> bool {
        self.expires_at > 0 && now >= self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now().timestamp())
    }

    pub fn expires_at_datetime(&self) -> Option<DateTime<Utc>> {
        if self.expires_at <= 0 {
            return None;
        }
        Utc.timestamp_opt(self.expires_at, 0).single()
    }

    pub fn cookie(&self, name: &str) -> Option<&Cookie> {
        self.cookies.iter().find(|cookie| cookie.name == name)
    }

    /// `Cookie` 请求头的值，没有 Cookie 时返回 `None`
    pub fn cookie_header(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }
        Some(
            self.cookies
                .iter()
                .map(Cookie::pair)
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}
