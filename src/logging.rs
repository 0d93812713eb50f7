//! 日志初始化

use std::sync::Once;

use tracing_subscriber::EnvFilter;

use crate::env::{core, EnvVar};

static INIT_TRACING: Once = Once::new();

/// 安装全局 tracing 订阅者，多次调用只生效一次
///
/// 过滤规则优先取 `RUST_LOG`，否则使用 `TRANSLAX_LOG_LEVEL`（默认 `info`）。
/// 设置了 `NO_COLOR` 时关闭 ANSI 颜色。已有全局订阅者时静默跳过。
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter());
        let no_color = core::NoColor::get().unwrap_or(false);

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_ansi(!no_color)
            .try_init();

        tracing::debug!("translaX tracing initialized");
    });
}

fn default_filter() -> EnvFilter {
    let level = core::LogLevel::get().unwrap_or_else(|e| {
        eprintln!("{}, falling back to info", e);
        "info".to_string()
    });
    EnvFilter::new(format!("{},hyper=warn,reqwest=warn", level))
}
