//! RVC Adapter - 音色转换模型加载与推理

mod fake_voice_model;
mod http_voice_converter;

pub use fake_voice_model::FakeVoiceModelLoader;
pub use http_voice_converter::*;
