//! Pipeline Orchestrator - 组合合成与转换阶段
//!
//! 合成后转换的状态流转:
//! Start → Synthesizing → {EmptyResult, SynthesisFailed, SynthesisOK → Converting → {ConversionOK, ConversionFailed}}
//!
//! 任何阶段失败即终止，不重试；合成之后的失败统一为 ConversionFailed

use std::time::Instant;
use uuid::Uuid;

use super::{ConversionStage, SynthesisStage};
use crate::application::commands::{
    AudioSource, ConversionRequest, ConversionTarget, GenerateCommand, SynthesisRequest,
};
use crate::application::error::PipelineError;
use crate::domain::speech::AudioBuffer;

/// 管线编排器
pub struct PipelineOrchestrator {
    synthesis: SynthesisStage,
    conversion: ConversionStage,
}

impl PipelineOrchestrator {
    pub fn new(synthesis: SynthesisStage, conversion: ConversionStage) -> Self {
        Self {
            synthesis,
            conversion,
        }
    }

    pub fn synthesis(&self) -> &SynthesisStage {
        &self.synthesis
    }

    /// 执行一次生成请求
    pub async fn run(&self, command: GenerateCommand) -> Result<AudioBuffer, PipelineError> {
        let request_id = Uuid::new_v4();
        let kind = command.kind();
        let started = Instant::now();
        tracing::info!(request_id = %request_id, kind, "Pipeline request started");

        let result = match command {
            GenerateCommand::SynthesizeOnly(request) => self
                .synthesis
                .synthesize(&request)
                .await
                .map(|output| output.audio),
            GenerateCommand::ConvertOnly(request) => self.conversion.convert(&request).await,
            GenerateCommand::SynthesizeThenConvert { synthesis, target } => {
                self.synthesize_then_convert(&synthesis, target).await
            }
        };

        let elapsed_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok(audio) => tracing::info!(
                request_id = %request_id,
                kind,
                samples = audio.len(),
                duration_ms = audio.duration_ms(),
                elapsed_ms,
                "Pipeline request completed"
            ),
            Err(e) if e.is_caller_error() => tracing::warn!(
                request_id = %request_id,
                kind,
                error = %e,
                elapsed_ms,
                "Pipeline request rejected"
            ),
            Err(e) => tracing::error!(
                request_id = %request_id,
                kind,
                error = %e,
                elapsed_ms,
                "Pipeline request failed"
            ),
        }
        result
    }

    async fn synthesize_then_convert(
        &self,
        synthesis: &SynthesisRequest,
        target: ConversionTarget,
    ) -> Result<AudioBuffer, PipelineError> {
        let output = self.synthesis.synthesize(synthesis).await?;

        // 静音不做转换
        let Some(artifact) = output.artifact else {
            tracing::info!("Synthesis produced no audio, skipping conversion");
            return Ok(AudioBuffer::empty());
        };

        tracing::debug!(path = %artifact.path().display(), "Handing synthesized audio to conversion");
        let request = ConversionRequest {
            source: AudioSource::File(artifact.to_path_buf()),
            target,
        };
        let result = self.conversion.convert(&request).await;

        // 无论转换成功与否都删除中间产物
        artifact.remove();

        // 合成成功后的任何转换错误都归为 ConversionFailed
        result.map_err(|e| match e {
            PipelineError::ConversionFailed(_) => e,
            other => PipelineError::ConversionFailed(other.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::pipeline::ModelDirs;
    use crate::application::ports::{ModelRegistryPort, SpeechEnginePort};
    use crate::domain::speech::ComputeDevice;
    use crate::infrastructure::adapters::{FakeSpeechEngine, FakeVoiceModelLoader, WavCodec};
    use crate::infrastructure::memory::InMemoryModelRegistry;
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;

    struct Fixture {
        _models: TempDir,
        artifacts: TempDir,
        engine: Arc<FakeSpeechEngine>,
        loader: Arc<FakeVoiceModelLoader>,
        registry: Arc<InMemoryModelRegistry>,
        orchestrator: PipelineOrchestrator,
    }

    fn fixture(engine: FakeSpeechEngine, loader: FakeVoiceModelLoader) -> Fixture {
        let models = tempfile::tempdir().unwrap();
        let model_dir = models.path().join("pth");
        let index_dir = models.path().join("index");
        std::fs::create_dir_all(&model_dir).unwrap();
        std::fs::create_dir_all(&index_dir).unwrap();
        std::fs::write(model_dir.join("tenor.model"), b"weights").unwrap();
        std::fs::write(index_dir.join("tenor.index"), b"index").unwrap();

        let artifacts = tempfile::tempdir().unwrap();
        let codec = Arc::new(WavCodec::new());
        let engine = Arc::new(engine);
        let loader = Arc::new(loader);
        let registry = Arc::new(InMemoryModelRegistry::new(loader.clone(), ComputeDevice::Cpu));

        let synthesis = SynthesisStage::new(
            Some(engine.clone() as Arc<dyn SpeechEnginePort>),
            codec.clone(),
            artifacts.path().to_path_buf(),
        );
        let conversion = ConversionStage::new(
            registry.clone(),
            codec,
            ModelDirs {
                model_dir,
                index_dir,
            },
            artifacts.path().to_path_buf(),
        );

        Fixture {
            _models: models,
            artifacts,
            engine,
            loader,
            registry,
            orchestrator: PipelineOrchestrator::new(synthesis, conversion),
        }
    }

    fn default_fixture() -> Fixture {
        fixture(FakeSpeechEngine::default(), FakeVoiceModelLoader::new())
    }

    fn artifact_count(f: &Fixture) -> usize {
        std::fs::read_dir(f.artifacts.path()).unwrap().count()
    }

    fn synthesis(text: &str) -> SynthesisRequest {
        SynthesisRequest::new(text, "ff_siwis", 1.0, "fr-fr").unwrap()
    }

    fn target(model: &str, pitch: i32) -> ConversionTarget {
        ConversionTarget::new(Some(model.to_string()), Some("tenor.index".to_string()), pitch)
            .unwrap()
    }

    fn silent_source() -> AudioSource {
        AudioSource::Samples(AudioBuffer::new(16000, vec![0.0; 3200]).unwrap())
    }

    #[tokio::test]
    async fn test_synthesize_only_bonjour() {
        let f = default_fixture();
        let audio = f
            .orchestrator
            .run(GenerateCommand::SynthesizeOnly(synthesis("Bonjour")))
            .await
            .unwrap();

        assert!(!audio.is_empty());
        assert_eq!(audio.sample_rate(), f.engine.native_sample_rate());
        assert_eq!(artifact_count(&f), 0);
    }

    #[tokio::test]
    async fn test_blank_text_creates_no_artifacts() {
        let f = default_fixture();
        for text in ["", "  ", "\t\n"] {
            let audio = f
                .orchestrator
                .run(GenerateCommand::SynthesizeOnly(synthesis(text)))
                .await
                .unwrap();
            assert!(audio.is_empty());

            let audio = f
                .orchestrator
                .run(GenerateCommand::SynthesizeThenConvert {
                    synthesis: synthesis(text),
                    target: target("tenor.model", 0),
                })
                .await
                .unwrap();
            assert!(audio.is_empty());
        }
        assert_eq!(f.engine.call_count(), 0);
        assert_eq!(f.loader.load_count(), 0);
        assert_eq!(artifact_count(&f), 0);
    }

    #[tokio::test]
    async fn test_synthesize_then_convert_removes_intermediate() {
        let f = default_fixture();
        let audio = f
            .orchestrator
            .run(GenerateCommand::SynthesizeThenConvert {
                synthesis: synthesis("Bonjour tout le monde"),
                target: target("tenor.model", 3),
            })
            .await
            .unwrap();

        assert!(!audio.is_empty());
        assert_eq!(audio.sample_rate(), FakeSpeechEngine::NATIVE_SAMPLE_RATE);

        let inputs = f.loader.seen_inputs();
        assert_eq!(inputs.len(), 1);
        assert!(!inputs[0].exists());
        assert_eq!(artifact_count(&f), 0);
    }

    #[tokio::test]
    async fn test_conversion_failure_still_removes_intermediate() {
        let f = fixture(
            FakeSpeechEngine::default(),
            FakeVoiceModelLoader::new().failing_inference("index mismatch"),
        );
        let result = f
            .orchestrator
            .run(GenerateCommand::SynthesizeThenConvert {
                synthesis: synthesis("Bonjour"),
                target: target("tenor.model", 0),
            })
            .await;

        assert!(matches!(result, Err(PipelineError::ConversionFailed(_))));
        let inputs = f.loader.seen_inputs();
        assert_eq!(inputs.len(), 1);
        assert!(!inputs[0].exists());
        assert_eq!(artifact_count(&f), 0);
    }

    #[tokio::test]
    async fn test_synthesis_failure_skips_conversion() {
        let f = fixture(
            FakeSpeechEngine::failing("phonemizer missing"),
            FakeVoiceModelLoader::new(),
        );
        let result = f
            .orchestrator
            .run(GenerateCommand::SynthesizeThenConvert {
                synthesis: synthesis("Bonjour"),
                target: target("tenor.model", 0),
            })
            .await;

        assert!(matches!(result, Err(PipelineError::SynthesisFailed(_))));
        assert_eq!(f.loader.load_count(), 0);
        assert!(f.loader.seen_inputs().is_empty());
        assert_eq!(artifact_count(&f), 0);
    }

    #[tokio::test]
    async fn test_convert_only_missing_model_file() {
        let f = default_fixture();
        let result = f
            .orchestrator
            .run(GenerateCommand::ConvertOnly(ConversionRequest {
                source: silent_source(),
                target: ConversionTarget::new(Some("missing.model".into()), None, 0).unwrap(),
            }))
            .await;

        assert!(matches!(result, Err(PipelineError::ModelNotFound(_))));
        assert!(f.registry.cached_keys().is_empty());
        assert_eq!(f.loader.load_count(), 0);
        assert_eq!(artifact_count(&f), 0);
    }

    #[tokio::test]
    async fn test_synthesize_then_convert_missing_model_is_conversion_failure() {
        let f = default_fixture();
        let result = f
            .orchestrator
            .run(GenerateCommand::SynthesizeThenConvert {
                synthesis: synthesis("Bonjour"),
                target: ConversionTarget::new(Some("missing.model".into()), None, 0).unwrap(),
            })
            .await;

        match result {
            Err(PipelineError::ConversionFailed(cause)) => assert!(cause.contains("missing.model")),
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(f.registry.cached_keys().is_empty());
        assert_eq!(f.loader.load_count(), 0);
        assert_eq!(artifact_count(&f), 0);
    }

    #[tokio::test]
    async fn test_concurrent_conversions_keep_their_own_pitch() {
        let f = fixture(
            FakeSpeechEngine::default(),
            FakeVoiceModelLoader::new()
                .with_load_delay(Duration::from_millis(50))
                .with_infer_delay(Duration::from_millis(20)),
        );
        let command = |pitch| {
            GenerateCommand::ConvertOnly(ConversionRequest {
                source: silent_source(),
                target: target("tenor.model", pitch),
            })
        };

        let (up, down) = tokio::join!(
            f.orchestrator.run(command(5)),
            f.orchestrator.run(command(-3))
        );
        let (up, down) = (up.unwrap(), down.unwrap());

        assert!(up.samples().iter().all(|s| (s - 0.05).abs() < 1e-3));
        assert!(down.samples().iter().all(|s| (s + 0.03).abs() < 1e-3));
        assert_eq!(f.loader.load_count(), 1);
        assert_eq!(artifact_count(&f), 0);
    }
}
