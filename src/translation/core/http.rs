//! 引擎出站请求
//!
//! [`EngineClient`] 是各引擎实现发送 HTTP 请求的唯一入口。带 Cookie 的请求
//! （`post_form`、`post_json`）会先向会话缓存索取当前会话，再附上 Cookie 和
//! User-Agent。只有表单请求额外附带该引擎特有的请求头。

use std::sync::Arc;

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE, COOKIE, USER_AGENT};
use serde::Serialize;

use crate::translation::core::engine::EngineName;
use crate::translation::error::{TranslationError, TranslationResult};
use crate::translation::storage::cache::SessionCache;
use crate::translation::storage::session::Session;

/// 引擎特有的请求头：(引擎, [(头部名称, 值)])
///
/// 头部名称必须是小写。
pub const ENGINE_HEADERS: &[(EngineName, &[(&str, &str)])] = &[(
    EngineName::Youdao,
    &[
        ("host", "fanyi.youdao.com"),
        ("origin", "https://fanyi.youdao.com"),
        ("sec-fetch-dest", "empty"),
        ("sec-fetch-mode", "cors"),
        ("sec-fetch-site", "same-origin"),
        ("sec-gpc", "1"),
        ("referer", "https://fanyi.youdao.com/"),
    ],
)];

/// 表单请求的 `Content-Type`
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=UTF-8";

fn user_agent_headers(user_agent: &str) -> TranslationResult<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, header_value(user_agent)?);
    Ok(headers)
}

/// 构造引擎请求头（不含 Cookie）
pub fn engine_headers(engine: EngineName, user_agent: &str) -> TranslationResult<HeaderMap> {
    let mut headers = user_agent_headers(user_agent)?;

    let extra = ENGINE_HEADERS
        .iter()
        .filter(|(owner, _)| *owner == engine)
        .flat_map(|(_, pairs)| pairs.iter());
    for (name, value) in extra {
        headers.insert(HeaderName::from_static(*name), HeaderValue::from_static(*value));
    }

    Ok(headers)
}

/// 会话对应的 `Cookie` 请求头
pub fn cookie_header(session: &Session) -> TranslationResult<Option<HeaderValue>> {
    session
        .cookie_header()
        .map(|cookies| header_value(&cookies))
        .transpose()
}

/// 非 2xx 响应视为上游错误
pub fn ensure_success(response: Response) -> TranslationResult<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(TranslationError::UpstreamError(format!(
            "{} 返回 HTTP {}",
            response.url(),
            status
        )))
    }
}

fn header_value(value: &str) -> TranslationResult<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| TranslationError::InvalidInput(format!("无效的请求头值 {:?}: {}", value, e)))
}

/// 单个引擎的请求客户端
pub struct EngineClient<'a> {
    engine: EngineName,
    http: &'a Client,
    sessions: &'a SessionCache,
    user_agent: &'a str,
}

impl<'a> EngineClient<'a> {
    pub fn new(
        engine: EngineName,
        http: &'a Client,
        sessions: &'a SessionCache,
        user_agent: &'a str,
    ) -> Self {
        Self {
            engine,
            http,
            sessions,
            user_agent,
        }
    }

    pub fn engine(&self) -> EngineName {
        self.engine
    }

    /// 当前引擎的有效会话
    pub fn session(&self) -> TranslationResult<Arc<Session>> {
        self.sessions.get_session(self.engine)
    }

    /// 不带 Cookie 的 GET 请求
    pub fn get(&self, url: &str) -> TranslationResult<Response> {
        let response = self
            .http
            .get(url)
            .headers(user_agent_headers(self.user_agent)?)
            .send()?;
        Ok(response)
    }

    /// 携带会话 Cookie 和引擎请求头的表单 POST
    pub fn post_form<T: Serialize + ?Sized>(&self, url: &str, form: &T) -> TranslationResult<Response> {
        let mut headers = engine_headers(self.engine, self.user_agent)?;
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE));
        self.send_with_session(self.http.post(url).form(form), headers)
    }

    /// 携带会话 Cookie 的 JSON POST，只附带 User-Agent
    pub fn post_json<T: Serialize + ?Sized>(&self, url: &str, body: &T) -> TranslationResult<Response> {
        let body = serde_json::to_vec(body)?;
        let mut headers = user_agent_headers(self.user_agent)?;
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self.send_with_session(self.http.post(url).body(body), headers)
    }

    fn send_with_session(
        &self,
        request: RequestBuilder,
        mut headers: HeaderMap,
    ) -> TranslationResult<Response> {
        let session = self.session()?;
        if let Some(cookies) = cookie_header(&session)? {
            headers.insert(COOKIE, cookies);
        }

        tracing::debug!("{} 发送请求，携带 {} 个 Cookie", self.engine, session.cookies.len());
        Ok(request.headers(headers).send()?)
    }
}
