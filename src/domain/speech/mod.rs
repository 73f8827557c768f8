//! Speech Context - 语音生成限界上下文
//!
//! 职责:
//! - 合成 / 转换参数的值对象与校验
//! - 模型缓存键与计算设备
//! - 内置音色与语言目录

mod catalog;
mod errors;
mod value_objects;

pub use catalog::{locale_name, voice_language, LOCALES, VOICES};
pub use errors::SpeechError;
pub use value_objects::{
    AudioBuffer, ComputeDevice, DevicePreference, Locale, ModelKey, PitchShift, SpeechRate,
    VoiceId, DEFAULT_SAMPLE_RATE,
};
