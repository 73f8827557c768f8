//! WAV Codec - 基于 symphonia 的无压缩音频编解码
//!
//! - 编码: 单声道 16-bit PCM WAV
//! - 解码: symphonia 探测 + 解码，多声道平均下混为单声道

use std::io::Cursor;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::application::ports::{AudioCodecPort, CodecError};
use crate::domain::speech::AudioBuffer;

const BITS_PER_SAMPLE: u16 = 16;
const WAV_HEADER_LEN: usize = 44;
/// 高于此采样率的文件视为损坏
const MAX_SAMPLE_RATE: u32 = 768_000;

/// WAV 编解码器
#[derive(Debug, Default, Clone)]
pub struct WavCodec;

impl WavCodec {
    pub fn new() -> Self {
        Self
    }

    fn decode_interleaved(&self, data: &[u8]) -> Result<(Vec<f32>, u32, usize), CodecError> {
        let cursor = Cursor::new(data.to_vec());
        let mss = MediaSourceStream::new(Box::new(cursor), Default::default());

        let mut hint = Hint::new();
        hint.with_extension("wav");

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| CodecError::DecodingError(format!("Probe failed: {}", e)))?;

        let mut format = probed.format;

        let track = format
            .default_track()
            .ok_or_else(|| CodecError::DecodingError("No audio track found".to_string()))?;

        let sample_rate = track
            .codec_params
            .sample_rate
            .ok_or_else(|| CodecError::DecodingError("Unknown sample rate".to_string()))?;

        let channels = track
            .codec_params
            .channels
            .map(|c| c.count())
            .ok_or_else(|| CodecError::DecodingError("Unknown channel count".to_string()))?;

        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| CodecError::DecodingError(format!("Decoder creation failed: {}", e)))?;

        let track_id = track.id;
        let mut samples: Vec<f32> = Vec::new();

        loop {
            let packet = match format.next_packet() {
                Ok(p) => p,
                Err(symphonia::core::errors::Error::IoError(e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break;
                }
                Err(e) => {
                    return Err(CodecError::DecodingError(format!(
                        "Packet read error: {}",
                        e
                    )));
                }
            };

            if packet.track_id() != track_id {
                continue;
            }

            // 输出必须完整，损坏的数据包直接报错
            let decoded = decoder
                .decode(&packet)
                .map_err(|e| CodecError::DecodingError(format!("Decode error: {}", e)))?;

            let spec = *decoded.spec();
            let num_frames = decoded.frames();
            let mut sample_buf = SampleBuffer::<f32>::new(num_frames as u64, spec);
            sample_buf.copy_interleaved_ref(decoded);
            let actual_samples = num_frames * spec.channels.count();
            samples.extend(&sample_buf.samples()[..actual_samples]);
        }

        Ok((samples, sample_rate, channels))
    }
}

/// 多声道平均下混
fn downmix(interleaved: Vec<f32>, channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved;
    }
    interleaved
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

impl AudioCodecPort for WavCodec {
    fn encode_wav(&self, audio: &AudioBuffer) -> Result<Vec<u8>, CodecError> {
        let num_channels: u16 = 1;
        let sample_rate = audio.sample_rate();
        let byte_rate = sample_rate
            .checked_mul(num_channels as u32 * (BITS_PER_SAMPLE / 8) as u32)
            .ok_or_else(|| {
                CodecError::EncodingError(format!("Sample rate too high: {}", sample_rate))
            })?;
        let block_align = num_channels * (BITS_PER_SAMPLE / 8);

        let data_size = audio.len() * 2;
        let file_size = 36 + data_size;
        if file_size > u32::MAX as usize {
            return Err(CodecError::EncodingError(format!(
                "Audio too long for WAV: {} samples",
                audio.len()
            )));
        }

        let mut wav = Vec::with_capacity(WAV_HEADER_LEN + data_size);

        // RIFF header
        wav.extend_from_slice(b"RIFF");
        wav.extend_from_slice(&(file_size as u32).to_le_bytes());
        wav.extend_from_slice(b"WAVE");

        // fmt chunk
        wav.extend_from_slice(b"fmt ");
        wav.extend_from_slice(&16u32.to_le_bytes());
        wav.extend_from_slice(&1u16.to_le_bytes()); // PCM
        wav.extend_from_slice(&num_channels.to_le_bytes());
        wav.extend_from_slice(&sample_rate.to_le_bytes());
        wav.extend_from_slice(&byte_rate.to_le_bytes());
        wav.extend_from_slice(&block_align.to_le_bytes());
        wav.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());

        // data chunk
        wav.extend_from_slice(b"data");
        wav.extend_from_slice(&(data_size as u32).to_le_bytes());

        for &sample in audio.samples() {
            let value = (sample.clamp(-1.0, 1.0) * 32767.0) as i16;
            wav.extend_from_slice(&value.to_le_bytes());
        }

        Ok(wav)
    }

    fn decode_wav(&self, data: &[u8]) -> Result<AudioBuffer, CodecError> {
        if data.len() < 12 || &data[0..4] != b"RIFF" || &data[8..12] != b"WAVE" {
            return Err(CodecError::InvalidInput(
                "Invalid WAV: missing RIFF/WAVE header".to_string(),
            ));
        }

        let (interleaved, sample_rate, channels) = self.decode_interleaved(data)?;
        if sample_rate > MAX_SAMPLE_RATE {
            return Err(CodecError::InvalidInput(format!(
                "Unsupported sample rate: {}",
                sample_rate
            )));
        }
        let samples = downmix(interleaved, channels);

        AudioBuffer::new(sample_rate, samples).map_err(|e| CodecError::DecodingError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pcm_wav(sample_rate: u32, num_channels: u16, samples: &[i16]) -> Vec<u8> {
        let block_align = num_channels * 2;
        let data_size = samples.len() * 2;
        let mut wav = Vec::new();
        wav.extend_from_slice(b"RIFF");
        wav.extend_from_slice(&((36 + data_size) as u32).to_le_bytes());
        wav.extend_from_slice(b"WAVE");
        wav.extend_from_slice(b"fmt ");
        wav.extend_from_slice(&16u32.to_le_bytes());
        wav.extend_from_slice(&1u16.to_le_bytes());
        wav.extend_from_slice(&num_channels.to_le_bytes());
        wav.extend_from_slice(&sample_rate.to_le_bytes());
        wav.extend_from_slice(&sample_rate.wrapping_mul(block_align as u32).to_le_bytes());
        wav.extend_from_slice(&block_align.to_le_bytes());
        wav.extend_from_slice(&16u16.to_le_bytes());
        wav.extend_from_slice(b"data");
        wav.extend_from_slice(&(data_size as u32).to_le_bytes());
        for sample in samples {
            wav.extend_from_slice(&sample.to_le_bytes());
        }
        wav
    }

    #[test]
    fn test_encode_header() {
        let audio = AudioBuffer::new(24000, vec![0.0; 240]).unwrap();
        let wav = WavCodec::new().encode_wav(&audio).unwrap();

        assert_eq!(wav.len(), WAV_HEADER_LEN + 480);
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(u32::from_le_bytes([wav[24], wav[25], wav[26], wav[27]]), 24000);
    }

    #[test]
    fn test_decode_preserves_rate_and_level() {
        let codec = WavCodec::new();
        let audio = AudioBuffer::new(22050, vec![0.5; 2205]).unwrap();
        let decoded = codec.decode_wav(&codec.encode_wav(&audio).unwrap()).unwrap();

        assert_eq!(decoded.sample_rate(), 22050);
        assert_eq!(decoded.len(), 2205);
        assert!(decoded.samples().iter().all(|s| (s - 0.5).abs() < 1e-3));
    }

    #[test]
    fn test_decode_downmixes_stereo() {
        let frames: Vec<i16> = [16384, 0].repeat(160);
        let wav = pcm_wav(16000, 2, &frames);
        let decoded = WavCodec::new().decode_wav(&wav).unwrap();

        assert_eq!(decoded.len(), 160);
        assert!((decoded.samples()[0] - 0.25).abs() < 1e-3);
    }

    #[test]
    fn test_absurd_sample_rate_is_rejected() {
        let codec = WavCodec::new();
        let wav = pcm_wav(3_000_000_000, 1, &[0; 64]);
        assert!(matches!(
            codec.decode_wav(&wav),
            Err(CodecError::InvalidInput(_))
        ));

        let audio = AudioBuffer::new(3_000_000_000, vec![0.0; 64]).unwrap();
        assert!(matches!(
            codec.encode_wav(&audio),
            Err(CodecError::EncodingError(_))
        ));
    }

    #[test]
    fn test_decode_rejects_non_wav() {
        let result = WavCodec::new().decode_wav(b"definitely not audio");
        assert!(matches!(result, Err(CodecError::InvalidInput(_))));
    }
}
