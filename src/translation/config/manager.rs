//! 配置管理器
//!
//! 配置来源按优先级从低到高：默认值、配置文件、环境变量

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::constants;
use crate::translation::error::{TranslationError, TranslationResult};

/// 客户端配置
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TranslaxConfig {
    /// 应用名，决定默认会话目录 `~/.config/<app_name>`
    pub app_name: String,
    /// 显式指定的会话目录，优先于默认目录
    pub session_dir: Option<PathBuf>,
    pub user_agent: String,
    pub request_timeout_secs: u64,
    /// 命中缓存时是否检查会话过期时间
    pub check_session_expiry: bool,
}

impl Default for TranslaxConfig {
    fn default() -> Self {
        Self {
            app_name: constants::APP_NAME.to_string(),
            session_dir: None,
            user_agent: constants::DEFAULT_USER_AGENT.to_string(),
            request_timeout_secs: constants::DEFAULT_REQUEST_TIMEOUT.as_secs(),
            check_session_expiry: true,
        }
    }
}

impl TranslaxConfig {
    /// 使用指定会话目录的默认配置
    pub fn with_session_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            session_dir: Some(dir.into()),
            ..Self::default()
        }
    }

    /// 验证配置
    pub fn validate(&self) -> TranslationResult<()> {
        if self.app_name.trim().is_empty() {
            return Err(TranslationError::ConfigError("应用名不能为空".to_string()));
        }

        if self.app_name.contains(&['/', '\\'][..]) {
            return Err(TranslationError::ConfigError(format!(
                "应用名不能包含路径分隔符: {}",
                self.app_name
            )));
        }

        if self.user_agent.trim().is_empty() {
            return Err(TranslationError::ConfigError("User-Agent 不能为空".to_string()));
        }

        if self.request_timeout_secs == 0 {
            return Err(TranslationError::ConfigError("请求超时不能为0".to_string()));
        }

        Ok(())
    }

    /// 应用环境变量覆盖
    pub fn apply_env_overrides(&mut self) {
        use crate::env::{http, session, EnvVar};

        if let Ok(dir) = session::Dir::get() {
            tracing::info!("环境变量覆盖会话目录: {}", dir.display());
            self.session_dir = Some(dir);
        }

        if let Ok(check) = session::CheckExpiry::get() {
            self.check_session_expiry = check;
        }

        if let Ok(user_agent) = http::UserAgent::get() {
            self.user_agent = user_agent;
        }

        if let Ok(timeout) = http::RequestTimeout::get() {
            self.request_timeout_secs = timeout.as_secs();
        }
    }

    /// 会话文件所在目录
    ///
    /// 未显式指定时为用户主目录下的 `.config/<app_name>`。
    pub fn session_dir(&self) -> TranslationResult<PathBuf> {
        if let Some(dir) = &self.session_dir {
            return Ok(PathBuf::from(
                shellexpand::tilde(&dir.to_string_lossy()).as_ref(),
            ));
        }

        let base = directories::BaseDirs::new().ok_or_else(|| {
            TranslationError::ConfigError("无法确定用户主目录".to_string())
        })?;
        Ok(base
            .home_dir()
            .join(constants::CONFIG_SUBDIR)
            .join(&self.app_name))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// 配置管理器
#[derive(Debug)]
pub struct ConfigManager {
    config: TranslaxConfig,
}

impl ConfigManager {
    /// 按默认搜索路径加载配置
    pub fn new() -> TranslationResult<Self> {
        Self::load_dotenv();

        let config = match Self::find_config_file() {
            Some(path) => {
                tracing::info!("加载配置文件: {}", path.display());
                Self::load_from_file(&path)?
            }
            None => {
                tracing::info!("未找到配置文件，使用默认配置");
                TranslaxConfig::default()
            }
        };

        Self::from_config(config)
    }

    /// 从指定文件加载，随后应用环境变量覆盖
    pub fn from_file(path: impl AsRef<Path>) -> TranslationResult<Self> {
        let config = Self::load_from_file(path.as_ref())?;
        Self::from_config(config)
    }

    fn from_config(mut config: TranslaxConfig) -> TranslationResult<Self> {
        config.apply_env_overrides();
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &TranslaxConfig {
        &self.config
    }

    pub fn into_config(self) -> TranslaxConfig {
        self.config
    }

    fn find_config_file() -> Option<PathBuf> {
        constants::CONFIG_PATHS
            .iter()
            .map(|path| PathBuf::from(shellexpand::tilde(path).as_ref()))
            .find(|path| path.exists())
    }

    /// 读取配置文件，`.toml` 以外的扩展名按 JSON 解析
    pub fn load_from_file(path: &Path) -> TranslationResult<TranslaxConfig> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| TranslationError::ConfigError(format!("读取配置文件失败: {}", e)))?;

        if path.extension().map_or(false, |ext| ext == "toml") {
            toml::from_str(&content)
                .map_err(|e| TranslationError::ConfigError(format!("解析TOML配置失败: {}", e)))
        } else {
            serde_json::from_str(&content)
                .map_err(|e| TranslationError::ConfigError(format!("解析JSON配置失败: {}", e)))
        }
    }

    /// 加载 .env 文件
    fn load_dotenv() {
        let env_files = [".env.local", ".env"];

        for env_file in &env_files {
            if Path::new(env_file).exists() && dotenv::from_filename(env_file).is_ok() {
                tracing::info!("已加载环境变量文件: {}", env_file);
                break;
            }
        }
    }

    /// 生成示例配置文件
    pub fn generate_example_config(path: impl AsRef<Path>) -> TranslationResult<()> {
        let content = toml::to_string_pretty(&TranslaxConfig::default())
            .map_err(|e| TranslationError::ConfigError(format!("序列化配置失败: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| TranslationError::ConfigError(format!("写入配置文件失败: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_is_valid() {
        let config = TranslaxConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.app_name, "translaX");
        assert!(config.check_session_expiry);
        assert_eq!(config.request_timeout(), constants::DEFAULT_REQUEST_TIMEOUT);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = TranslaxConfig::default();
        config.request_timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = TranslaxConfig::default();
        config.app_name = "a/b".to_string();
        assert!(config.validate().is_err());

        let mut config = TranslaxConfig::default();
        config.user_agent = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_explicit_session_dir_wins() {
        let temp_dir = TempDir::new().unwrap();
        let config = TranslaxConfig::with_session_dir(temp_dir.path());
        assert_eq!(config.session_dir().unwrap(), temp_dir.path());
    }

    #[test]
    fn test_default_session_dir_under_home() {
        let config = TranslaxConfig::default();
        if let Ok(dir) = config.session_dir() {
            assert!(dir.ends_with(".config/translaX"));
        }
    }

    #[test]
    fn test_partial_toml_file_keeps_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("translax.toml");
        std::fs::write(&path, "request_timeout_secs = 5\ncheck_session_expiry = false\n").unwrap();

        let config = ConfigManager::load_from_file(&path).unwrap();
        assert_eq!(config.request_timeout_secs, 5);
        assert!(!config.check_session_expiry);
        assert_eq!(config.user_agent, constants::DEFAULT_USER_AGENT);
    }

    #[test]
    fn test_json_file_and_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        std::fs::write(&path, r#"{"app_name": "other"}"#).unwrap();
        assert_eq!(ConfigManager::load_from_file(&path).unwrap().app_name, "other");

        std::fs::write(&path, "{not json").unwrap();
        let err = ConfigManager::load_from_file(&path).unwrap_err();
        assert!(matches!(err, TranslationError::ConfigError(_)));
    }

    #[test]
    fn test_generate_example_config_round_trips() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("example.toml");

        ConfigManager::generate_example_config(&path).unwrap();
        let config = ConfigManager::load_from_file(&path).unwrap();
        assert_eq!(config.app_name, constants::APP_NAME);
        assert!(config.session_dir.is_none());
    }
}
