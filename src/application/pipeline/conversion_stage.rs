//! Conversion Stage - RVC 音色转换阶段
//!
//! 输入音频（文件或内存样本）→ 已缓存的模型句柄 → 输出临时产物 → 读回内存

use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::TempArtifact;
use crate::application::commands::{AudioSource, ConversionRequest};
use crate::application::error::PipelineError;
use crate::application::ports::{AudioCodecPort, ModelRegistryPort};
use crate::domain::speech::{AudioBuffer, ModelKey};

const INPUT_PREFIX: &str = "rvc_in_";
const OUTPUT_PREFIX: &str = "rvc_out_";

/// 模型与索引文件目录
#[derive(Debug, Clone)]
pub struct ModelDirs {
    pub model_dir: PathBuf,
    pub index_dir: PathBuf,
}

/// 转换阶段
pub struct ConversionStage {
    registry: Arc<dyn ModelRegistryPort>,
    codec: Arc<dyn AudioCodecPort>,
    dirs: ModelDirs,
    artifact_dir: PathBuf,
}

impl ConversionStage {
    pub fn new(
        registry: Arc<dyn ModelRegistryPort>,
        codec: Arc<dyn AudioCodecPort>,
        dirs: ModelDirs,
        artifact_dir: PathBuf,
    ) -> Self {
        Self {
            registry,
            codec,
            dirs,
            artifact_dir,
        }
    }

    pub async fn convert(&self, request: &ConversionRequest) -> Result<AudioBuffer, PipelineError> {
        // 内存样本需要落盘；staged 持有到本函数返回
        let staged = self.stage_source(&request.source).await?;
        let input_path = match (&request.source, &staged) {
            (_, Some(artifact)) => artifact.path(),
            (AudioSource::File(path), None) => path.as_path(),
            (AudioSource::Samples(_), None) => {
                return Err(PipelineError::InvalidSourceAudio(
                    "in-memory audio was not staged".to_string(),
                ))
            }
        };

        let target = &request.target;
        let model_file = target.model_file.as_deref().ok_or(PipelineError::MissingModel)?;
        let key = ModelKey::resolve(
            &self.dirs.model_dir,
            model_file,
            &self.dirs.index_dir,
            target.index_file.as_deref(),
        )?;

        tracing::info!(
            source = %input_path.display(),
            model = %model_file,
            index = ?target.index_file,
            pitch = %target.pitch,
            "Converting voice"
        );

        let handle = self.registry.acquire(&key).await?;

        let output = TempArtifact::create(&self.artifact_dir, OUTPUT_PREFIX).map_err(|e| {
            PipelineError::ConversionFailed(format!("Failed to create temporary file: {}", e))
        })?;

        handle
            .infer_file(input_path, output.path(), target.pitch)
            .await
            .map_err(|e| {
                tracing::error!(model = %key.model_name(), error = %e, "Voice conversion failed");
                PipelineError::ConversionFailed(e.to_string())
            })?;

        let audio = self.read_output(output.path()).await?;
        output.remove();

        tracing::info!(
            samples = audio.len(),
            sample_rate = audio.sample_rate(),
            "Voice conversion completed"
        );
        Ok(audio)
    }

    async fn stage_source(
        &self,
        source: &AudioSource,
    ) -> Result<Option<TempArtifact>, PipelineError> {
        match source {
            AudioSource::File(path) => {
                if !path.is_file() {
                    return Err(PipelineError::InvalidSourceAudio(format!(
                        "audio file not found: {}",
                        path.display()
                    )));
                }
                Ok(None)
            }
            AudioSource::Samples(audio) => {
                if audio.is_empty() {
                    return Err(PipelineError::InvalidSourceAudio(
                        "audio contains no samples".to_string(),
                    ));
                }
                let wav = self
                    .codec
                    .encode_wav(audio)
                    .map_err(|e| PipelineError::InvalidSourceAudio(e.to_string()))?;
                let artifact = TempArtifact::create(&self.artifact_dir, INPUT_PREFIX).map_err(|e| {
                    PipelineError::ConversionFailed(format!("Failed to create temporary file: {}", e))
                })?;
                tokio::fs::write(artifact.path(), &wav).await.map_err(|e| {
                    PipelineError::ConversionFailed(format!("Failed to stage source audio: {}", e))
                })?;
                Ok(Some(artifact))
            }
        }
    }

    async fn read_output(&self, path: &Path) -> Result<AudioBuffer, PipelineError> {
        let data = tokio::fs::read(path).await.map_err(|e| {
            PipelineError::ConversionFailed(format!("Failed to read converted audio: {}", e))
        })?;
        self.codec
            .decode_wav(&data)
            .map_err(|e| PipelineError::ConversionFailed(e.to_string()))
    }
}
