//! HTTP Speech Engine - 调用外部 Kokoro 推理服务
//!
//! 外部 TTS API:
//! POST {base_url}/api/tts/synthesize
//! Request: {"text": "...", "voice": "ff_siwis", "speed": 1.0, "lang": "fr-fr",
//!           "model_path": "...", "voices_path": "..."}  (JSON)
//! Response: audio/wav binary

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use super::super::map_request_error;
use crate::application::ports::{
    AudioCodecPort, EngineError, SpeechEnginePort, SpeechOutput, SpeechParams,
};

/// Kokoro 原生采样率
pub const KOKORO_SAMPLE_RATE: u32 = 24000;

/// TTS 推理请求体 (JSON)
#[derive(Debug, Serialize)]
struct SynthesizeHttpRequest<'a> {
    text: &'a str,
    voice: &'a str,
    speed: f32,
    lang: &'a str,
    /// 模型与音色文件由推理服务自行加载并缓存
    model_path: &'a str,
    voices_path: &'a str,
}

/// HTTP Speech Engine 配置
#[derive(Debug, Clone)]
pub struct HttpSpeechEngineConfig {
    /// 推理服务基础 URL
    pub base_url: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
    /// Kokoro 模型文件
    pub model_path: PathBuf,
    /// Kokoro 音色文件
    pub voices_path: PathBuf,
}

impl Default for HttpSpeechEngineConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_secs: 120,
            model_path: PathBuf::from("modelTTS/kokoro-v1.0.onnx"),
            voices_path: PathBuf::from("modelTTS/voices-v1.0.bin"),
        }
    }
}

impl HttpSpeechEngineConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_assets(mut self, model_path: PathBuf, voices_path: PathBuf) -> Self {
        self.model_path = model_path;
        self.voices_path = voices_path;
        self
    }

    /// 返回第一个不存在的资源文件
    fn missing_asset(&self) -> Option<&PathBuf> {
        [&self.model_path, &self.voices_path]
            .into_iter()
            .find(|path| !path.is_file())
    }
}

/// HTTP Speech Engine
pub struct HttpSpeechEngine {
    client: Client,
    config: HttpSpeechEngineConfig,
    codec: Arc<dyn AudioCodecPort>,
}

impl HttpSpeechEngine {
    pub fn new(
        config: HttpSpeechEngineConfig,
        codec: Arc<dyn AudioCodecPort>,
    ) -> Result<Self, EngineError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| EngineError::NetworkError(e.to_string()))?;

        Ok(Self {
            client,
            config,
            codec,
        })
    }

    /// 启动时初始化引擎
    ///
    /// 资源文件缺失或服务不可达时返回 None，服务进入“TTS 不可用”状态
    pub async fn initialize(
        config: HttpSpeechEngineConfig,
        codec: Arc<dyn AudioCodecPort>,
    ) -> Option<Self> {
        if let Some(missing) = config.missing_asset() {
            tracing::warn!(path = %missing.display(), "TTS asset not found, synthesis disabled");
            return None;
        }

        let engine = match Self::new(config, codec) {
            Ok(engine) => engine,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to build TTS client, synthesis disabled");
                return None;
            }
        };

        if !engine.health_check().await {
            tracing::warn!(
                url = %engine.config.base_url,
                "TTS service health check failed, synthesis disabled"
            );
            return None;
        }

        tracing::info!(
            url = %engine.config.base_url,
            model = %engine.config.model_path.display(),
            "TTS engine ready"
        );
        Some(engine)
    }

    fn synthesize_url(&self) -> String {
        format!("{}/api/tts/synthesize", self.config.base_url)
    }

    fn health_url(&self) -> String {
        format!("{}/health", self.config.base_url)
    }
}

#[async_trait]
impl SpeechEnginePort for HttpSpeechEngine {
    async fn synthesize(&self, params: SpeechParams) -> Result<SpeechOutput, EngineError> {
        let model_path = self.config.model_path.to_string_lossy();
        let voices_path = self.config.voices_path.to_string_lossy();
        let http_request = SynthesizeHttpRequest {
            text: &params.text,
            voice: params.voice.as_str(),
            speed: params.rate.value(),
            lang: params.locale.as_str(),
            model_path: &model_path,
            voices_path: &voices_path,
        };

        tracing::debug!(
            url = %self.synthesize_url(),
            text_len = params.text.len(),
            voice = %params.voice,
            "Sending TTS synthesize request"
        );

        let response = self
            .client
            .post(self.synthesize_url())
            .json(&http_request)
            .send()
            .await
            .map_err(map_request_error)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(EngineError::ServiceError(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| EngineError::InvalidResponse(format!("Failed to read audio: {}", e)))?;

        let audio = self
            .codec
            .decode_wav(&bytes)
            .map_err(|e| EngineError::InvalidResponse(e.to_string()))?;

        tracing::info!(
            sample_rate = audio.sample_rate(),
            samples = audio.len(),
            "TTS inference completed"
        );

        Ok(SpeechOutput {
            sample_rate: audio.sample_rate(),
            samples: audio.into_samples(),
        })
    }

    fn native_sample_rate(&self) -> u32 {
        KOKORO_SAMPLE_RATE
    }

    async fn health_check(&self) -> bool {
        match self
            .client
            .get(self.health_url())
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}
