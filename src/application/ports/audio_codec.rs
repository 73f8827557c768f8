//! Audio Codec Port - 无压缩音频编解码抽象
//!
//! 推理引擎以文件通信时，由管线负责 WAV 的写入与读回

use thiserror::Error;

use crate::domain::speech::AudioBuffer;

/// 编解码错误
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),

    #[error("Decoding error: {0}")]
    DecodingError(String),
}

/// Audio Codec Port
pub trait AudioCodecPort: Send + Sync {
    /// 编码为 WAV 字节
    fn encode_wav(&self, audio: &AudioBuffer) -> Result<Vec<u8>, CodecError>;

    /// 解码 WAV 字节，多声道下混为单声道
    fn decode_wav(&self, data: &[u8]) -> Result<AudioBuffer, CodecError>;
}
