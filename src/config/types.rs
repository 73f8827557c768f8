//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::path::PathBuf;

use crate::domain::speech::DevicePreference;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// TTS 引擎配置
    #[serde(default)]
    pub tts: TtsConfig,

    /// RVC 引擎配置
    #[serde(default)]
    pub rvc: RvcConfig,

    /// 存储配置
    #[serde(default)]
    pub storage: StorageConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 推理引擎模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineMode {
    /// 调用外部推理服务
    #[default]
    Http,
    /// 内置 Fake 引擎（离线开发）
    Fake,
}

impl std::fmt::Display for EngineMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineMode::Http => write!(f, "http"),
            EngineMode::Fake => write!(f, "fake"),
        }
    }
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    7860
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// TTS 引擎配置
#[derive(Debug, Clone, Deserialize)]
pub struct TtsConfig {
    #[serde(default)]
    pub mode: EngineMode,

    /// TTS 服务基础 URL
    #[serde(default = "default_tts_url")]
    pub url: String,

    /// Kokoro 模型文件
    #[serde(default = "default_tts_model_path")]
    pub model_path: PathBuf,

    /// Kokoro 音色文件
    #[serde(default = "default_tts_voices_path")]
    pub voices_path: PathBuf,

    /// 请求超时时间（秒）
    #[serde(default = "default_tts_timeout")]
    pub timeout_secs: u64,
}

fn default_tts_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_tts_model_path() -> PathBuf {
    PathBuf::from("modelTTS/kokoro-v1.0.onnx")
}

fn default_tts_voices_path() -> PathBuf {
    PathBuf::from("modelTTS/voices-v1.0.bin")
}

fn default_tts_timeout() -> u64 {
    120
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            mode: EngineMode::default(),
            url: default_tts_url(),
            model_path: default_tts_model_path(),
            voices_path: default_tts_voices_path(),
            timeout_secs: default_tts_timeout(),
        }
    }
}

/// RVC 引擎配置
#[derive(Debug, Clone, Deserialize)]
pub struct RvcConfig {
    #[serde(default)]
    pub mode: EngineMode,

    /// RVC 服务基础 URL
    #[serde(default = "default_rvc_url")]
    pub url: String,

    /// 模型文件目录
    #[serde(default = "default_model_dir")]
    pub model_dir: PathBuf,

    /// 索引文件目录
    #[serde(default = "default_index_dir")]
    pub index_dir: PathBuf,

    /// 计算设备: auto / cpu / cuda
    #[serde(default)]
    pub device: DevicePreference,

    /// 请求超时时间（秒），模型首次加载可能较慢
    #[serde(default = "default_rvc_timeout")]
    pub timeout_secs: u64,
}

fn default_rvc_url() -> String {
    "http://localhost:8001".to_string()
}

fn default_model_dir() -> PathBuf {
    PathBuf::from("modelRVC/pth")
}

fn default_index_dir() -> PathBuf {
    PathBuf::from("modelRVC/index")
}

fn default_rvc_timeout() -> u64 {
    300
}

impl Default for RvcConfig {
    fn default() -> Self {
        Self {
            mode: EngineMode::default(),
            url: default_rvc_url(),
            model_dir: default_model_dir(),
            index_dir: default_index_dir(),
            device: DevicePreference::default(),
            timeout_secs: default_rvc_timeout(),
        }
    }
}

/// 存储配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageConfig {
    /// 中间音频文件目录，未设置时使用系统临时目录
    #[serde(default)]
    pub temp_dir: Option<PathBuf>,
}

impl StorageConfig {
    pub fn artifact_dir(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 7860);
        assert_eq!(config.tts.mode, EngineMode::Http);
        assert_eq!(config.rvc.model_dir, PathBuf::from("modelRVC/pth"));
        assert_eq!(config.rvc.device, DevicePreference::Auto);
    }

    #[test]
    fn test_server_addr() {
        assert_eq!(ServerConfig::default().addr(), "0.0.0.0:7860");
    }

    #[test]
    fn test_artifact_dir_falls_back_to_os_temp() {
        assert_eq!(StorageConfig::default().artifact_dir(), std::env::temp_dir());
        let storage = StorageConfig {
            temp_dir: Some(PathBuf::from("/var/tmp/vocalis")),
        };
        assert_eq!(storage.artifact_dir(), PathBuf::from("/var/tmp/vocalis"));
    }
}
