//! Speech Context - Errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("Unknown voice: {0}")]
    UnknownVoice(String),

    #[error("Unsupported locale: {0}")]
    UnsupportedLocale(String),

    #[error("Speech rate {0} out of range (0.5 - 2.0)")]
    RateOutOfRange(f32),

    #[error("Pitch shift {0} out of range (-24 - 24 semitones)")]
    PitchOutOfRange(i32),

    #[error("Invalid sample rate: {0}")]
    InvalidSampleRate(u32),

    #[error("Invalid file name: {0}")]
    InvalidFileName(String),
}
