//! Speech Engine Port - TTS 推理引擎抽象
//!
//! 定义文本转语音的抽象接口，具体实现在 infrastructure/adapters 层

use async_trait::async_trait;

use super::EngineError;
use crate::domain::speech::{Locale, SpeechRate, VoiceId};

/// TTS 合成参数
#[derive(Debug, Clone)]
pub struct SpeechParams {
    /// 要合成的文本（已去除首尾空白，非空）
    pub text: String,
    pub voice: VoiceId,
    pub rate: SpeechRate,
    pub locale: Locale,
}

/// TTS 合成结果
#[derive(Debug, Clone)]
pub struct SpeechOutput {
    /// 单声道浮点样本，可能为空
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

/// Speech Engine Port
///
/// 外部 TTS 引擎的抽象接口
#[async_trait]
pub trait SpeechEnginePort: Send + Sync {
    /// 执行 TTS 推理
    async fn synthesize(&self, params: SpeechParams) -> Result<SpeechOutput, EngineError>;

    /// 引擎原生采样率
    fn native_sample_rate(&self) -> u32;

    /// 检查引擎是否可用
    async fn health_check(&self) -> bool {
        true
    }
}
