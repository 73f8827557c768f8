//! Infrastructure Adapters
//!
//! 六边形架构的适配器实现

pub mod rvc;
pub mod transcoder;
pub mod tts;

pub use rvc::*;
pub use transcoder::*;
pub use tts::*;

use crate::application::ports::EngineError;

/// reqwest 错误 → EngineError（TTS / RVC 客户端共用）
pub(crate) fn map_request_error(e: reqwest::Error) -> EngineError {
    if e.is_timeout() {
        EngineError::Timeout
    } else if e.is_connect() {
        EngineError::NetworkError(format!("Cannot connect to inference service: {}", e))
    } else {
        EngineError::NetworkError(e.to_string())
    }
}
