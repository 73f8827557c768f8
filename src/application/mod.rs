//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（SpeechEngine、VoiceModelLoader、AudioCodec、ModelRegistry）
//! - commands: 生成请求
//! - pipeline: 合成 / 转换阶段及编排器
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod pipeline;
pub mod ports;

pub use commands::{
    AudioSource, ConversionRequest, ConversionTarget, GenerateCommand, SynthesisRequest,
};
pub use error::PipelineError;
pub use pipeline::{
    ConversionStage, ModelDirs, PipelineOrchestrator, SynthesisOutput, SynthesisStage,
    TempArtifact,
};
pub use ports::{
    AudioCodecPort, CodecError, EngineError, ModelHandle, ModelLoadSpec, ModelRegistryPort,
    SpeechEnginePort, SpeechOutput, SpeechParams, VoiceModelLoaderPort, VoiceModelPort,
};
