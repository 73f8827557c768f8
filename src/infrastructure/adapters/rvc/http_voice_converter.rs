//! HTTP Voice Converter - 调用外部 RVC 推理服务
//!
//! 外部 RVC API:
//! POST {base_url}/api/rvc/load
//! Request: {"model_path": "...", "index_path": "..." | null, "device": "cuda:0"}  (JSON)
//! Response: {"model_id": "..."}
//!
//! POST {base_url}/api/rvc/infer
//! Request: multipart (model_id, f0_up_key, file)
//! Response: audio/wav binary

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use super::super::map_request_error;
use crate::application::ports::{EngineError, ModelLoadSpec, VoiceModelLoaderPort, VoiceModelPort};
use crate::domain::speech::PitchShift;

#[derive(Debug, Serialize)]
struct LoadHttpRequest {
    model_path: String,
    index_path: Option<String>,
    device: String,
}

#[derive(Debug, Deserialize)]
struct LoadHttpResponse {
    model_id: String,
}

/// HTTP Voice Converter 配置
#[derive(Debug, Clone)]
pub struct HttpVoiceConverterConfig {
    /// RVC 服务基础 URL
    pub base_url: String,
    /// 请求超时时间（秒），模型加载与推理共用
    pub timeout_secs: u64,
}

impl Default for HttpVoiceConverterConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8001".to_string(),
            timeout_secs: 300,
        }
    }
}

impl HttpVoiceConverterConfig {
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
}

/// HTTP RVC 模型加载器
pub struct HttpVoiceModelLoader {
    client: Client,
    config: HttpVoiceConverterConfig,
}

impl HttpVoiceModelLoader {
    pub fn new(config: HttpVoiceConverterConfig) -> Result<Self, EngineError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| EngineError::NetworkError(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn load_url(&self) -> String {
        format!("{}/api/rvc/load", self.config.base_url)
    }
}

#[async_trait]
impl VoiceModelLoaderPort for HttpVoiceModelLoader {
    async fn load(&self, spec: &ModelLoadSpec) -> Result<Box<dyn VoiceModelPort>, EngineError> {
        let http_request = LoadHttpRequest {
            model_path: spec.model_path.to_string_lossy().to_string(),
            index_path: spec
                .index_path
                .as_ref()
                .map(|p| p.to_string_lossy().to_string()),
            device: spec.device.to_string(),
        };

        tracing::debug!(
            url = %self.load_url(),
            model = %http_request.model_path,
            device = %http_request.device,
            "Sending RVC load request"
        );

        let response = self
            .client
            .post(self.load_url())
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

        let body: LoadHttpResponse = response
            .json()
            .await
            .map_err(|e| EngineError::InvalidResponse(format!("Bad load response: {}", e)))?;

        tracing::info!(model_id = %body.model_id, "RVC model loaded remotely");

        Ok(Box::new(HttpVoiceModel {
            client: self.client.clone(),
            infer_url: format!("{}/api/rvc/infer", self.config.base_url),
            model_id: body.model_id,
        }))
    }
}

/// 远端已加载的 RVC 模型
struct HttpVoiceModel {
    client: Client,
    infer_url: String,
    model_id: String,
}

#[async_trait]
impl VoiceModelPort for HttpVoiceModel {
    async fn infer_file(
        &mut self,
        input: &Path,
        output: &Path,
        pitch: PitchShift,
    ) -> Result<(), EngineError> {
        let audio = tokio::fs::read(input).await?;
        let file_name = input
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "input.wav".to_string());

        let part = Part::bytes(audio)
            .file_name(file_name)
            .mime_str("audio/wav")
            .map_err(|e| EngineError::NetworkError(e.to_string()))?;
        let form = Form::new()
            .text("model_id", self.model_id.clone())
            .text("f0_up_key", pitch.semitones().to_string())
            .part("file", part);

        let response = self
            .client
            .post(&self.infer_url)
            .multipart(form)
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
        tokio::fs::write(output, &bytes).await?;

        tracing::debug!(
            model_id = %self.model_id,
            pitch = %pitch,
            audio_size = bytes.len(),
            "RVC inference completed"
        );
        Ok(())
    }
}
