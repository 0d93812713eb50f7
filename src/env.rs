//! 统一的环境变量管理
//!
//! 每个环境变量是一个实现了 [`EnvVar`] 的单元结构体，带有名称、默认值、
//! 说明和解析规则。没有默认值的变量未设置时 `get` 返回错误，调用方据此
//! 判断是否需要覆盖配置文件中的值。

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// 环境变量解析错误
#[derive(Debug, Clone)]
pub struct EnvError {
    pub variable: String,
    pub message: String,
}

impl fmt::Display for EnvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Environment variable '{}': {}", self.variable, self.message)
    }
}

impl std::error::Error for EnvError {}

pub type EnvResult<T> = Result<T, EnvError>;

/// 环境变量访问器特性
pub trait EnvVar<T> {
    const NAME: &'static str;
    const DEFAULT: Option<T>;
    const DESCRIPTION: &'static str;

    fn parse(value: &str) -> EnvResult<T>;

    fn get() -> EnvResult<T> {
        match env::var(Self::NAME) {
            Ok(value) => Self::parse(&value),
            Err(_) => Self::DEFAULT.ok_or_else(|| EnvError {
                variable: Self::NAME.to_string(),
                message: "Environment variable not set".to_string(),
            }),
        }
    }

    fn get_or_default(default: T) -> T {
        Self::get().unwrap_or(default)
    }
}

/// 核心环境变量
pub mod core {
    use super::*;

    /// 日志级别
    pub struct LogLevel;
    impl EnvVar<String> for LogLevel {
        const NAME: &'static str = "TRANSLAX_LOG_LEVEL";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Log level: trace, debug, info, warn, error";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("info".to_string()),
            }
        }

        fn parse(value: &str) -> EnvResult<String> {
            let level = value.trim().to_lowercase();
            match level.as_str() {
                "trace" | "debug" | "info" | "warn" | "error" => Ok(level),
                _ => Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: format!(
                        "Invalid log level '{}'. Use: trace, debug, info, warn, error",
                        value
                    ),
                }),
            }
        }
    }

    /// 禁用颜色输出
    pub struct NoColor;
    impl EnvVar<bool> for NoColor {
        const NAME: &'static str = "NO_COLOR";
        const DEFAULT: Option<bool> = Some(false);
        const DESCRIPTION: &'static str = "Disable colored output when set to any value";

        fn parse(value: &str) -> EnvResult<bool> {
            // NO_COLOR 约定：任何非空值都表示禁用颜色
            Ok(!value.is_empty())
        }
    }
}

/// 会话存储相关环境变量
pub mod session {
    use super::*;

    /// 会话目录
    pub struct Dir;
    impl EnvVar<PathBuf> for Dir {
        const NAME: &'static str = "TRANSLAX_SESSION_DIR";
        const DEFAULT: Option<PathBuf> = None;
        const DESCRIPTION: &'static str = "Directory holding per-engine session files";

        fn parse(value: &str) -> EnvResult<PathBuf> {
            let dir = value.trim();
            if dir.is_empty() {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Directory cannot be empty".to_string(),
                });
            }
            Ok(PathBuf::from(shellexpand::tilde(dir).as_ref()))
        }
    }

    /// 是否检查会话过期
    pub struct CheckExpiry;
    impl EnvVar<bool> for CheckExpiry {
        const NAME: &'static str = "TRANSLAX_CHECK_SESSION_EXPIRY";
        const DEFAULT: Option<bool> = None;
        const DESCRIPTION: &'static str = "Refresh cached sessions whose expiry time has passed";

        fn parse(value: &str) -> EnvResult<bool> {
            parse_bool(value, Self::NAME)
        }
    }
}

/// HTTP 客户端相关环境变量
pub mod http {
    use super::*;

    /// User-Agent
    pub struct UserAgent;
    impl EnvVar<String> for UserAgent {
        const NAME: &'static str = "TRANSLAX_USER_AGENT";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "User-Agent header sent to translation engines";

        fn parse(value: &str) -> EnvResult<String> {
            let agent = value.trim();
            if agent.is_empty() {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "User-Agent cannot be empty".to_string(),
                });
            }
            Ok(agent.to_string())
        }
    }

    /// 请求超时
    pub struct RequestTimeout;
    impl EnvVar<Duration> for RequestTimeout {
        const NAME: &'static str = "TRANSLAX_REQUEST_TIMEOUT";
        const DEFAULT: Option<Duration> = None;
        const DESCRIPTION: &'static str = "HTTP request timeout in seconds";

        fn parse(value: &str) -> EnvResult<Duration> {
            let seconds = parse_u64_in_range(value, Self::NAME, 1, 300)?;
            Ok(Duration::from_secs(seconds))
        }
    }
}

/// 辅助函数
fn parse_bool(value: &str, var_name: &str) -> EnvResult<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" | "enabled" => Ok(true),
        "false" | "0" | "no" | "off" | "disabled" => Ok(false),
        _ => Err(EnvError {
            variable: var_name.to_string(),
            message: format!(
                "Invalid boolean value '{}'. Use: true/false, 1/0, yes/no, on/off, enabled/disabled",
                value
            ),
        }),
    }
}

fn parse_u64_in_range(value: &str, var_name: &str, min: u64, max: u64) -> EnvResult<u64> {
    let num: u64 = value.trim().parse().map_err(|_| EnvError {
        variable: var_name.to_string(),
        message: "Must be a valid positive number".to_string(),
    })?;

    if num < min {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Value {} is below minimum {}", num, min),
        });
    }

    if num > max {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Value {} exceeds maximum {}", num, max),
        });
    }

    Ok(num)
}

/// 环境变量配置汇总
#[derive(Debug, Clone)]
pub struct EnvConfig {
    pub log_level: String,
    pub no_color: bool,
    pub session_dir: Option<PathBuf>,
    pub check_session_expiry: Option<bool>,
    pub user_agent: Option<String>,
    pub request_timeout: Option<Duration>,
}

impl EnvConfig {
    /// 读取全部环境变量
    ///
    /// 已设置但无法解析的变量会返回错误，未设置的可选变量为 `None`。
    pub fn from_env() -> EnvResult<Self> {
        Ok(Self {
            log_level: core::LogLevel::get()?,
            no_color: core::NoColor::get()?,
            session_dir: optional::<session::Dir, PathBuf>()?,
            check_session_expiry: optional::<session::CheckExpiry, bool>()?,
            user_agent: optional::<http::UserAgent, String>()?,
            request_timeout: optional::<http::RequestTimeout, Duration>()?,
        })
    }

}

fn optional<V: EnvVar<T>, T>() -> EnvResult<Option<T>> {
    if env::var_os(V::NAME).is_none() {
        return Ok(None);
    }
    V::get().map(Some)
}

/// 环境变量文档生成器
pub fn generate_env_docs() -> String {
    fn entry<V: EnvVar<T>, T: fmt::Debug>(docs: &mut String) {
        docs.push_str(&format!(
            "- `{}`: {} (default: {:?})\n",
            V::NAME,
            V::DESCRIPTION,
            V::DEFAULT
        ));
    }

    let mut docs = String::new();
    docs.push_str("# Environment Variables Documentation\n\n");

    docs.push_str("## Core Configuration\n\n");
    entry::<core::LogLevel, String>(&mut docs);
    entry::<core::NoColor, bool>(&mut docs);

    docs.push_str("\n## Session Configuration\n\n");
    entry::<session::Dir, PathBuf>(&mut docs);
    entry::<session::CheckExpiry, bool>(&mut docs);

    docs.push_str("\n## HTTP Configuration\n\n");
    entry::<http::UserAgent, String>(&mut docs);
    entry::<http::RequestTimeout, Duration>(&mut docs);

    docs
}
