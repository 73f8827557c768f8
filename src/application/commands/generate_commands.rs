//! Generate Commands - 生成请求
//!
//! 每次调用构造一次，不持久化

use std::path::PathBuf;

use crate::application::error::PipelineError;
use crate::domain::speech::{AudioBuffer, Locale, PitchShift, SpeechRate, VoiceId};

/// 合成请求
///
/// 文本允许为空或全空白：此时生成空音频而不是报错
#[derive(Debug, Clone)]
pub struct SynthesisRequest {
    pub text: String,
    pub voice: VoiceId,
    pub rate: SpeechRate,
    pub locale: Locale,
}

impl SynthesisRequest {
    pub fn new(
        text: impl Into<String>,
        voice: &str,
        speed: f32,
        locale: &str,
    ) -> Result<Self, PipelineError> {
        Ok(Self {
            text: text.into(),
            voice: VoiceId::parse(voice)?,
            rate: SpeechRate::new(speed)?,
            locale: Locale::parse(locale)?,
        })
    }

    /// 去除首尾空白后的文本，空文本返回 None
    pub fn trimmed_text(&self) -> Option<&str> {
        let text = self.text.trim();
        (!text.is_empty()).then_some(text)
    }
}

/// 源音频 - 文件引用或内存样本
#[derive(Debug, Clone)]
pub enum AudioSource {
    File(PathBuf),
    Samples(AudioBuffer),
}

/// 转换目标 - 模型文件名、可选索引文件名与音高
#[derive(Debug, Clone)]
pub struct ConversionTarget {
    /// 缺失时转换阶段返回 `MissingModel`
    pub model_file: Option<String>,
    pub index_file: Option<String>,
    pub pitch: PitchShift,
}

impl ConversionTarget {
    pub fn new(
        model_file: Option<String>,
        index_file: Option<String>,
        pitch: i32,
    ) -> Result<Self, PipelineError> {
        Ok(Self {
            model_file: non_blank(model_file),
            index_file: non_blank(index_file),
            pitch: PitchShift::new(pitch)?,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// 转换请求
#[derive(Debug, Clone)]
pub struct ConversionRequest {
    pub source: AudioSource,
    pub target: ConversionTarget,
}

/// 管线命令
#[derive(Debug, Clone)]
pub enum GenerateCommand {
    /// 仅合成
    SynthesizeOnly(SynthesisRequest),
    /// 仅转换（调用方提供音频）
    ConvertOnly(ConversionRequest),
    /// 合成后转换
    SynthesizeThenConvert {
        synthesis: SynthesisRequest,
        target: ConversionTarget,
    },
}

impl GenerateCommand {
    pub fn kind(&self) -> &'static str {
        match self {
            GenerateCommand::SynthesizeOnly(_) => "synthesize_only",
            GenerateCommand::ConvertOnly(_) => "convert_only",
            GenerateCommand::SynthesizeThenConvert { .. } => "synthesize_then_convert",
        }
    }
}
