//! TTS Adapter - 语音合成引擎实现

mod fake_speech_engine;
mod http_speech_engine;

pub use fake_speech_engine::FakeSpeechEngine;
pub use http_speech_engine::*;
