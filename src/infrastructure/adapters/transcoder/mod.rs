//! Audio Transcoder Adapter

mod wav_codec;

pub use wav_codec::WavCodec;
