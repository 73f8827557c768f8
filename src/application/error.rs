//! 应用层错误定义
//!
//! 生成管线的统一错误类型，每个变体都携带可读的原因描述

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::speech::SpeechError;

/// 管线错误
#[derive(Debug, Error)]
pub enum PipelineError {
    /// TTS 引擎启动时初始化失败，重启前所有合成都会失败
    #[error("TTS engine is not loaded")]
    EngineUnavailable,

    /// 模型文件不存在
    #[error("Voice model file not found: {}", .0.display())]
    ModelNotFound(PathBuf),

    /// 模型加载失败
    #[error("Failed to load voice model: {0}")]
    ModelLoadFailed(String),

    /// 源音频无法解析
    #[error("Invalid source audio: {0}")]
    InvalidSourceAudio(String),

    /// 未指定目标模型
    #[error("No voice model selected")]
    MissingModel,

    /// 参数越界或非法
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// 合成失败
    #[error("Speech synthesis failed: {0}")]
    SynthesisFailed(String),

    /// 转换失败
    #[error("Voice conversion failed: {0}")]
    ConversionFailed(String),
}

impl PipelineError {
    /// 调用方输入错误（修正输入后可重试）
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::ModelNotFound(_)
                | Self::InvalidSourceAudio(_)
                | Self::MissingModel
                | Self::InvalidParameter(_)
        )
    }
}

impl From<SpeechError> for PipelineError {
    fn from(err: SpeechError) -> Self {
        Self::InvalidParameter(err.to_string())
    }
}
