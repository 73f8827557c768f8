//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::{AppConfig, EngineMode};

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `VOCALIS_`，层级分隔符 `__`）
/// 2. 配置文件（config.toml 或 config.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `VOCALIS_SERVER__PORT=8080`
/// - `VOCALIS_TTS__URL=http://kokoro:8000`
/// - `VOCALIS_RVC__DEVICE=cpu`
/// - `VOCALIS_STORAGE__TEMP_DIR=/var/tmp/vocalis`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 默认值（最低优先级）
    builder = builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 7860)?
        .set_default("tts.mode", "http")?
        .set_default("tts.url", "http://localhost:8000")?
        .set_default("tts.model_path", "modelTTS/kokoro-v1.0.onnx")?
        .set_default("tts.voices_path", "modelTTS/voices-v1.0.bin")?
        .set_default("tts.timeout_secs", 120)?
        .set_default("rvc.mode", "http")?
        .set_default("rvc.url", "http://localhost:8001")?
        .set_default("rvc.model_dir", "modelRVC/pth")?
        .set_default("rvc.index_dir", "modelRVC/index")?
        .set_default("rvc.device", "auto")?
        .set_default("rvc.timeout_secs", 300)?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 配置文件（如果存在）
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 环境变量（最高优先级）
    // 例如: VOCALIS_RVC__MODEL_DIR=/models/rvc
    builder = builder.add_source(
        Environment::with_prefix("VOCALIS")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "Server port cannot be 0".to_string(),
        ));
    }

    if config.tts.mode == EngineMode::Http && config.tts.url.is_empty() {
        return Err(ConfigError::ValidationError(
            "TTS URL cannot be empty in http mode".to_string(),
        ));
    }

    if config.rvc.mode == EngineMode::Http && config.rvc.url.is_empty() {
        return Err(ConfigError::ValidationError(
            "RVC URL cannot be empty in http mode".to_string(),
        ));
    }

    if config.tts.timeout_secs == 0 || config.rvc.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "Engine timeouts cannot be 0".to_string(),
        ));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}:{}", config.server.host, config.server.port);
    tracing::info!("TTS Mode: {}", config.tts.mode);
    if config.tts.mode == EngineMode::Http {
        tracing::info!("TTS URL: {}", config.tts.url);
        tracing::info!("TTS Timeout: {}s", config.tts.timeout_secs);
    }
    tracing::info!("TTS Model: {:?}", config.tts.model_path);
    tracing::info!("TTS Voices: {:?}", config.tts.voices_path);
    tracing::info!("RVC Mode: {}", config.rvc.mode);
    if config.rvc.mode == EngineMode::Http {
        tracing::info!("RVC URL: {}", config.rvc.url);
        tracing::info!("RVC Timeout: {}s", config.rvc.timeout_secs);
    }
    tracing::info!("RVC Model Directory: {:?}", config.rvc.model_dir);
    tracing::info!("RVC Index Directory: {:?}", config.rvc.index_dir);
    tracing::info!("RVC Device Preference: {:?}", config.rvc.device);
    tracing::info!("Temp Directory: {:?}", config.storage.artifact_dir());
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::speech::DevicePreference;
    use std::path::PathBuf;

    #[test]
    fn test_validation_passes_for_valid_config() {
        let config = AppConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validation_error_for_zero_port() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_empty_url_only_matters_in_http_mode() {
        let mut config = AppConfig::default();
        config.rvc.url = String::new();
        assert!(validate_config(&config).is_err());

        config.rvc.mode = EngineMode::Fake;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validation_error_for_zero_timeout() {
        let mut config = AppConfig::default();
        config.tts.timeout_secs = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vocalis.toml");
        std::fs::write(
            &path,
            r#"
[server]
port = 9000

[tts]
mode = "fake"

[rvc]
model_dir = "/srv/models/pth"
device = "cpu"

[storage]
temp_dir = "/srv/tmp"
"#,
        )
        .unwrap();

        let config = load_config_from_path(Some(&path)).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.tts.mode, EngineMode::Fake);
        assert_eq!(config.tts.url, "http://localhost:8000");
        assert_eq!(config.rvc.model_dir, PathBuf::from("/srv/models/pth"));
        assert_eq!(config.rvc.index_dir, PathBuf::from("modelRVC/index"));
        assert_eq!(config.rvc.device, DevicePreference::Cpu);
        assert_eq!(config.storage.temp_dir, Some(PathBuf::from("/srv/tmp")));
    }
}
