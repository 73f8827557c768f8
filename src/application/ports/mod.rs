//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod audio_codec;
mod engine_error;
mod model_registry;
mod speech_engine;
mod voice_converter;

pub use audio_codec::{AudioCodecPort, CodecError};
pub use engine_error::EngineError;
pub use model_registry::{ModelHandle, ModelRegistryPort};
pub use speech_engine::{SpeechEnginePort, SpeechOutput, SpeechParams};
pub use voice_converter::{ModelLoadSpec, VoiceModelLoaderPort, VoiceModelPort};
