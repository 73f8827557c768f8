//! Synthesis Stage - 文本转语音阶段
//!
//! 产出内存音频，同时写入一个 WAV 临时产物供下游文件式引擎使用

use std::path::PathBuf;
use std::sync::Arc;

use super::TempArtifact;
use crate::application::commands::SynthesisRequest;
use crate::application::error::PipelineError;
use crate::application::ports::{AudioCodecPort, SpeechEnginePort, SpeechParams};
use crate::domain::speech::AudioBuffer;

const ARTIFACT_PREFIX: &str = "tts_";

/// 合成结果
///
/// 空文本或引擎返回零样本时 `artifact` 为 None
#[derive(Debug)]
pub struct SynthesisOutput {
    pub audio: AudioBuffer,
    pub artifact: Option<TempArtifact>,
}

impl SynthesisOutput {
    fn empty() -> Self {
        Self {
            audio: AudioBuffer::empty(),
            artifact: None,
        }
    }
}

/// 合成阶段
pub struct SynthesisStage {
    /// 启动时初始化失败则为 None
    engine: Option<Arc<dyn SpeechEnginePort>>,
    codec: Arc<dyn AudioCodecPort>,
    artifact_dir: PathBuf,
}

impl SynthesisStage {
    pub fn new(
        engine: Option<Arc<dyn SpeechEnginePort>>,
        codec: Arc<dyn AudioCodecPort>,
        artifact_dir: PathBuf,
    ) -> Self {
        Self {
            engine,
            codec,
            artifact_dir,
        }
    }

    pub fn is_available(&self) -> bool {
        self.engine.is_some()
    }

    pub async fn synthesize(
        &self,
        request: &SynthesisRequest,
    ) -> Result<SynthesisOutput, PipelineError> {
        let engine = self.engine.as_ref().ok_or(PipelineError::EngineUnavailable)?;

        let Some(text) = request.trimmed_text() else {
            tracing::debug!("Empty text, returning empty audio");
            return Ok(SynthesisOutput::empty());
        };

        tracing::info!(
            voice = %request.voice,
            speed = request.rate.value(),
            locale = %request.locale,
            text_len = text.chars().count(),
            "Synthesizing speech"
        );

        let params = SpeechParams {
            text: text.to_string(),
            voice: request.voice.clone(),
            rate: request.rate,
            locale: request.locale.clone(),
        };
        let output = engine.synthesize(params).await.map_err(|e| {
            tracing::error!(error = %e, "Speech synthesis failed");
            PipelineError::SynthesisFailed(e.to_string())
        })?;

        if output.samples.is_empty() {
            tracing::warn!("Engine produced no samples, returning empty audio");
            return Ok(SynthesisOutput::empty());
        }

        let audio = AudioBuffer::new(output.sample_rate, output.samples)
            .map_err(|e| PipelineError::SynthesisFailed(e.to_string()))?;

        tracing::info!(
            samples = audio.len(),
            sample_rate = audio.sample_rate(),
            "Speech synthesized"
        );

        let artifact = self.write_artifact(&audio).await?;
        Ok(SynthesisOutput {
            audio,
            artifact: Some(artifact),
        })
    }

    /// 失败时产物随 drop 删除
    async fn write_artifact(&self, audio: &AudioBuffer) -> Result<TempArtifact, PipelineError> {
        let artifact = TempArtifact::create(&self.artifact_dir, ARTIFACT_PREFIX).map_err(|e| {
            PipelineError::SynthesisFailed(format!("Failed to create temporary file: {}", e))
        })?;

        let wav = self
            .codec
            .encode_wav(audio)
            .map_err(|e| PipelineError::SynthesisFailed(e.to_string()))?;

        tokio::fs::write(artifact.path(), &wav).await.map_err(|e| {
            tracing::error!(
                path = %artifact.path().display(),
                error = %e,
                "Failed to write synthesized audio"
            );
            PipelineError::SynthesisFailed(format!("Failed to write audio: {}", e))
        })?;

        tracing::debug!(path = %artifact.path().display(), "Synthesized audio staged");
        Ok(artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::adapters::{FakeSpeechEngine, WavCodec};

    fn stage(engine: Option<Arc<dyn SpeechEnginePort>>, dir: &std::path::Path) -> SynthesisStage {
        SynthesisStage::new(engine, Arc::new(WavCodec::new()), dir.to_path_buf())
    }

    fn file_count(dir: &std::path::Path) -> usize {
        std::fs::read_dir(dir).unwrap().count()
    }

    #[tokio::test]
    async fn test_engine_unavailable_fails_fast() {
        let dir = tempfile::tempdir().unwrap();
        let stage = stage(None, dir.path());
        // 空文本也不能绕过引擎检查
        let request = SynthesisRequest::new("", "af_heart", 1.0, "en-us").unwrap();

        let result = stage.synthesize(&request).await;
        assert!(matches!(result, Err(PipelineError::EngineUnavailable)));
    }

    #[tokio::test]
    async fn test_blank_text_returns_empty_without_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let engine = Arc::new(FakeSpeechEngine::default());
        let stage = stage(Some(engine.clone() as Arc<dyn SpeechEnginePort>), dir.path());

        for text in ["", "   ", "\n\t"] {
            let request = SynthesisRequest::new(text, "af_heart", 1.0, "en-us").unwrap();
            let output = stage.synthesize(&request).await.unwrap();
            assert!(output.audio.is_empty());
            assert!(output.artifact.is_none());
        }
        assert_eq!(engine.call_count(), 0);
        assert_eq!(file_count(dir.path()), 0);
    }

    #[tokio::test]
    async fn test_synthesize_writes_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let stage = stage(Some(Arc::new(FakeSpeechEngine::default()) as Arc<dyn SpeechEnginePort>), dir.path());
        let request = SynthesisRequest::new("Bonjour", "ff_siwis", 1.0, "fr-fr").unwrap();

        let output = stage.synthesize(&request).await.unwrap();
        assert!(!output.audio.is_empty());
        assert_eq!(output.audio.sample_rate(), FakeSpeechEngine::NATIVE_SAMPLE_RATE);

        let artifact = output.artifact.unwrap();
        let decoded = WavCodec::new()
            .decode_wav(&std::fs::read(artifact.path()).unwrap())
            .unwrap();
        assert_eq!(decoded.len(), output.audio.len());

        let path = artifact.to_path_buf();
        drop(artifact);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_engine_failure_leaves_no_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let engine = FakeSpeechEngine::failing("model crashed");
        let stage = stage(Some(Arc::new(engine) as Arc<dyn SpeechEnginePort>), dir.path());
        let request = SynthesisRequest::new("Hello", "af_heart", 1.0, "en-us").unwrap();

        match stage.synthesize(&request).await {
            Err(PipelineError::SynthesisFailed(cause)) => assert!(cause.contains("model crashed")),
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(file_count(dir.path()), 0);
    }

    #[tokio::test]
    async fn test_silent_engine_output_is_empty_audio() {
        let dir = tempfile::tempdir().unwrap();
        let engine = FakeSpeechEngine::silent();
        let stage = stage(Some(Arc::new(engine) as Arc<dyn SpeechEnginePort>), dir.path());
        let request = SynthesisRequest::new("...", "af_heart", 1.0, "en-us").unwrap();

        let output = stage.synthesize(&request).await.unwrap();
        assert!(output.audio.is_empty());
        assert!(output.artifact.is_none());
        assert_eq!(file_count(dir.path()), 0);
    }
}
