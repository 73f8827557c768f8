//! Fake Voice Model - 用于测试的 RVC 模型
//!
//! 输出 = 输入样本 + 音高半音数 × 0.01，便于断言实际生效的音高

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::application::ports::{
    AudioCodecPort, EngineError, ModelLoadSpec, VoiceModelLoaderPort, VoiceModelPort,
};
use crate::domain::speech::{AudioBuffer, PitchShift};
use crate::infrastructure::adapters::WavCodec;

const OFFSET_PER_SEMITONE: f32 = 0.01;

#[derive(Debug, Clone, Default)]
struct FakeBehavior {
    load_error: Option<String>,
    infer_error: Option<String>,
    garbled: bool,
    load_delay: Duration,
    infer_delay: Duration,
}

/// Fake 模型加载器
#[derive(Default)]
pub struct FakeVoiceModelLoader {
    behavior: FakeBehavior,
    loads: AtomicUsize,
    seen_inputs: Arc<Mutex<Vec<PathBuf>>>,
}

impl FakeVoiceModelLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_load(mut self, message: impl Into<String>) -> Self {
        self.behavior.load_error = Some(message.into());
        self
    }

    pub fn failing_inference(mut self, message: impl Into<String>) -> Self {
        self.behavior.infer_error = Some(message.into());
        self
    }

    /// 推理输出写入非 WAV 数据
    pub fn garbled_output(mut self) -> Self {
        self.behavior.garbled = true;
        self
    }

    pub fn with_load_delay(mut self, delay: Duration) -> Self {
        self.behavior.load_delay = delay;
        self
    }

    pub fn with_infer_delay(mut self, delay: Duration) -> Self {
        self.behavior.infer_delay = delay;
        self
    }

    /// 加载尝试次数（含失败）
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    /// 所有推理调用收到的输入路径
    pub fn seen_inputs(&self) -> Vec<PathBuf> {
        self.seen_inputs
            .lock()
            .map(|inputs| inputs.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl VoiceModelLoaderPort for FakeVoiceModelLoader {
    async fn load(&self, spec: &ModelLoadSpec) -> Result<Box<dyn VoiceModelPort>, EngineError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.behavior.load_delay).await;

        if let Some(message) = &self.behavior.load_error {
            return Err(EngineError::ServiceError(message.clone()));
        }

        tracing::debug!(
            model = %spec.model_path.display(),
            device = %spec.device,
            "FakeVoiceModel loaded"
        );

        Ok(Box::new(FakeVoiceModel {
            behavior: self.behavior.clone(),
            codec: WavCodec::new(),
            f0_up_key: 0,
            seen_inputs: self.seen_inputs.clone(),
        }))
    }
}

/// Fake 模型实例
///
/// 与真实引擎一样先记录音高再推理，暴露并发覆盖问题
struct FakeVoiceModel {
    behavior: FakeBehavior,
    codec: WavCodec,
    f0_up_key: i32,
    seen_inputs: Arc<Mutex<Vec<PathBuf>>>,
}

#[async_trait]
impl VoiceModelPort for FakeVoiceModel {
    async fn infer_file(
        &mut self,
        input: &Path,
        output: &Path,
        pitch: PitchShift,
    ) -> Result<(), EngineError> {
        self.f0_up_key = pitch.semitones();
        if let Ok(mut inputs) = self.seen_inputs.lock() {
            inputs.push(input.to_path_buf());
        }

        tokio::time::sleep(self.behavior.infer_delay).await;

        if let Some(message) = &self.behavior.infer_error {
            return Err(EngineError::ServiceError(message.clone()));
        }

        if self.behavior.garbled {
            tokio::fs::write(output, b"not a wav file").await?;
            return Ok(());
        }

        let bytes = tokio::fs::read(input).await?;
        let source = self
            .codec
            .decode_wav(&bytes)
            .map_err(|e| EngineError::InvalidResponse(e.to_string()))?;

        let offset = self.f0_up_key as f32 * OFFSET_PER_SEMITONE;
        let shifted: Vec<f32> = source.samples().iter().map(|s| s + offset).collect();
        let converted = AudioBuffer::new(source.sample_rate(), shifted)
            .map_err(|e| EngineError::InvalidResponse(e.to_string()))?;

        let encoded = self
            .codec
            .encode_wav(&converted)
            .map_err(|e| EngineError::InvalidResponse(e.to_string()))?;
        tokio::fs::write(output, encoded).await?;

        Ok(())
    }
}
