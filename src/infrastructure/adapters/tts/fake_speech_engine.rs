//! Fake Speech Engine - 用于测试和本地开发的 TTS 引擎
//!
//! 不调用任何外部服务，按文本长度生成正弦波

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::application::ports::{EngineError, SpeechEnginePort, SpeechOutput, SpeechParams};

/// 每个字符对应的时长（秒，1.0 倍速）
const SECONDS_PER_CHAR: f32 = 0.06;
const TONE_HZ: f32 = 220.0;
const AMPLITUDE: f32 = 0.3;

#[derive(Debug, Clone)]
enum Behavior {
    Tone,
    Silent,
    Fail(String),
}

/// Fake Speech Engine
pub struct FakeSpeechEngine {
    behavior: Behavior,
    calls: AtomicUsize,
}

impl FakeSpeechEngine {
    /// 与 Kokoro 一致的原生采样率
    pub const NATIVE_SAMPLE_RATE: u32 = 24000;

    fn with_behavior(behavior: Behavior) -> Self {
        Self {
            behavior,
            calls: AtomicUsize::new(0),
        }
    }

    /// 每次推理都返回错误
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_behavior(Behavior::Fail(message.into()))
    }

    /// 推理成功但不产出样本
    pub fn silent() -> Self {
        Self::with_behavior(Behavior::Silent)
    }

    /// 已执行的推理次数
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for FakeSpeechEngine {
    fn default() -> Self {
        Self::with_behavior(Behavior::Tone)
    }
}

#[async_trait]
impl SpeechEnginePort for FakeSpeechEngine {
    async fn synthesize(&self, params: SpeechParams) -> Result<SpeechOutput, EngineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        tracing::debug!(
            text_len = params.text.len(),
            voice = %params.voice,
            locale = %params.locale,
            "FakeSpeechEngine: generating tone"
        );

        let samples = match &self.behavior {
            Behavior::Fail(message) => return Err(EngineError::ServiceError(message.clone())),
            Behavior::Silent => Vec::new(),
            Behavior::Tone => {
                let seconds =
                    params.text.chars().count() as f32 * SECONDS_PER_CHAR / params.rate.value();
                let count = (seconds * Self::NATIVE_SAMPLE_RATE as f32) as usize;
                (0..count)
                    .map(|i| {
                        let t = i as f32 / Self::NATIVE_SAMPLE_RATE as f32;
                        AMPLITUDE * (2.0 * std::f32::consts::PI * TONE_HZ * t).sin()
                    })
                    .collect()
            }
        };

        Ok(SpeechOutput {
            samples,
            sample_rate: Self::NATIVE_SAMPLE_RATE,
        })
    }

    fn native_sample_rate(&self) -> u32 {
        Self::NATIVE_SAMPLE_RATE
    }
}
