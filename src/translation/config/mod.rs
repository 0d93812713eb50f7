//! 翻译客户端配置管理模块
//!
//! 提供简化的配置管理，支持环境变量、配置文件和默认值

pub mod manager;

// 重新导出主要类型
pub use manager::{ConfigManager, TranslaxConfig};

/// 配置常量
pub mod constants {
    use std::time::Duration;

    /// 应用名，同时是会话目录名
    pub const APP_NAME: &str = "translaX";

    /// 会话目录相对于用户主目录的位置
    pub const CONFIG_SUBDIR: &str = ".config";

    pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/88.0.4324.146 Safari/537.36";

    pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    // 配置文件搜索路径
    pub const CONFIG_PATHS: &[&str] = &[
        "translax.toml",
        ".translax.toml",
        "~/.config/translaX/config.toml",
        "~/.config/translaX/config.json",
    ];
}

