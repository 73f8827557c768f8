//! Speech Context - Value Objects

use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

use super::catalog::{LOCALES, VOICES};
use super::SpeechError;

/// 空音频的默认采样率
pub const DEFAULT_SAMPLE_RATE: u32 = 44100;

/// 加速设备节点，存在即视为可用
const ACCELERATOR_DEVICE_NODE: &str = "/dev/nvidiactl";

/// Kokoro 音色标识
///
/// 不变量: 必须属于内置音色目录
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct VoiceId(String);

impl VoiceId {
    pub fn parse(code: impl Into<String>) -> Result<Self, SpeechError> {
        let code = code.into();
        if !VOICES.contains(&code.as_str()) {
            return Err(SpeechError::UnknownVoice(code));
        }
        Ok(Self(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for VoiceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 语言标签（影响发音）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Locale(String);

impl Locale {
    pub fn parse(tag: impl Into<String>) -> Result<Self, SpeechError> {
        let tag = tag.into().to_lowercase();
        if !LOCALES.iter().any(|(code, _)| *code == tag) {
            return Err(SpeechError::UnsupportedLocale(tag));
        }
        Ok(Self(tag))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 语速倍率 (0.5 - 2.0)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpeechRate(f32);

impl SpeechRate {
    pub const MIN: f32 = 0.5;
    pub const MAX: f32 = 2.0;

    pub fn new(rate: f32) -> Result<Self, SpeechError> {
        if !(Self::MIN..=Self::MAX).contains(&rate) {
            return Err(SpeechError::RateOutOfRange(rate));
        }
        Ok(Self(rate))
    }

    pub fn value(&self) -> f32 {
        self.0
    }
}

impl Default for SpeechRate {
    fn default() -> Self {
        Self(1.0)
    }
}

/// 音高偏移（半音，-24 - 24）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct PitchShift(i8);

impl PitchShift {
    pub const MIN: i32 = -24;
    pub const MAX: i32 = 24;

    pub fn new(semitones: i32) -> Result<Self, SpeechError> {
        if !(Self::MIN..=Self::MAX).contains(&semitones) {
            return Err(SpeechError::PitchOutOfRange(semitones));
        }
        Ok(Self(semitones as i8))
    }

    pub fn semitones(&self) -> i32 {
        self.0 as i32
    }
}

impl std::fmt::Display for PitchShift {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:+}", self.0)
    }
}

/// 模型缓存键 - (模型文件, 可选索引文件)
///
/// 不变量:
/// - 结构相等；无索引与任何有索引的键都不相等
/// - 路径由受信任目录和纯文件名拼接而成
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModelKey {
    model_path: PathBuf,
    index_path: Option<PathBuf>,
}

impl ModelKey {
    pub fn new(model_path: PathBuf, index_path: Option<PathBuf>) -> Self {
        Self {
            model_path,
            index_path,
        }
    }

    /// 由文件名解析出具体路径
    pub fn resolve(
        model_dir: &Path,
        model_file: &str,
        index_dir: &Path,
        index_file: Option<&str>,
    ) -> Result<Self, SpeechError> {
        let model_path = model_dir.join(plain_file_name(model_file)?);
        let index_path = index_file
            .map(|name| plain_file_name(name).map(|name| index_dir.join(name)))
            .transpose()?;
        Ok(Self::new(model_path, index_path))
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    pub fn index_path(&self) -> Option<&Path> {
        self.index_path.as_deref()
    }

    /// 用于日志的模型文件名
    pub fn model_name(&self) -> String {
        self.model_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.model_path.display().to_string())
    }
}

impl std::fmt::Display for ModelKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.index_path {
            Some(index) => write!(f, "{} [{}]", self.model_path.display(), index.display()),
            None => write!(f, "{}", self.model_path.display()),
        }
    }
}

/// 只接受单段文件名，拒绝目录穿越
fn plain_file_name(name: &str) -> Result<&str, SpeechError> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(name),
        _ => Err(SpeechError::InvalidFileName(name.to_string())),
    }
}

/// 计算设备
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ComputeDevice {
    Cuda(u32),
    Cpu,
}

impl std::fmt::Display for ComputeDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComputeDevice::Cuda(index) => write!(f, "cuda:{}", index),
            ComputeDevice::Cpu => write!(f, "cpu"),
        }
    }
}

/// 设备偏好（来自配置）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DevicePreference {
    /// 有加速器则用 cuda:0，否则 cpu
    #[default]
    Auto,
    Cpu,
    Cuda,
}

impl DevicePreference {
    /// 探测本机加速器并解析为具体设备
    pub fn resolve(self) -> ComputeDevice {
        self.resolve_with(Path::new(ACCELERATOR_DEVICE_NODE).exists())
    }

    pub fn resolve_with(self, accelerator_available: bool) -> ComputeDevice {
        match self {
            DevicePreference::Cpu => ComputeDevice::Cpu,
            DevicePreference::Cuda => ComputeDevice::Cuda(0),
            DevicePreference::Auto if accelerator_available => ComputeDevice::Cuda(0),
            DevicePreference::Auto => ComputeDevice::Cpu,
        }
    }
}

/// 内存中的音频 - 采样率 + 单声道浮点样本
///
/// 空样本表示“没有音频”，与错误不同
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    sample_rate: u32,
    samples: Vec<f32>,
}

impl AudioBuffer {
    pub fn new(sample_rate: u32, samples: Vec<f32>) -> Result<Self, SpeechError> {
        if sample_rate == 0 {
            return Err(SpeechError::InvalidSampleRate(sample_rate));
        }
        Ok(Self {
            sample_rate,
            samples,
        })
    }

    /// 规范的空音频
    pub fn empty() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            samples: Vec::new(),
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration_ms(&self) -> u64 {
        (self.samples.len() as u64 * 1000) / self.sample_rate as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voice_id_must_be_in_catalog() {
        assert!(VoiceId::parse("ff_siwis").is_ok());
        assert!(matches!(
            VoiceId::parse("xx_nobody"),
            Err(SpeechError::UnknownVoice(_))
        ));
    }

    #[test]
    fn test_locale_is_case_insensitive() {
        assert_eq!(Locale::parse("FR-FR").unwrap().as_str(), "fr-fr");
        assert!(Locale::parse("de").is_err());
    }

    #[test]
    fn test_speech_rate_bounds() {
        assert!(SpeechRate::new(0.5).is_ok());
        assert!(SpeechRate::new(2.0).is_ok());
        assert!(SpeechRate::new(0.49).is_err());
        assert!(SpeechRate::new(f32::NAN).is_err());
    }

    #[test]
    fn test_pitch_shift_bounds() {
        assert_eq!(PitchShift::new(-24).unwrap().semitones(), -24);
        assert_eq!(PitchShift::new(5).unwrap().to_string(), "+5");
        assert!(PitchShift::new(25).is_err());
    }

    #[test]
    fn test_model_key_equality() {
        let without = ModelKey::new(PathBuf::from("m/a.model"), None);
        let with = ModelKey::new(
            PathBuf::from("m/a.model"),
            Some(PathBuf::from("i/a.index")),
        );
        assert_ne!(without, with);
        assert_eq!(without, ModelKey::new(PathBuf::from("m/a.model"), None));
    }

    #[test]
    fn test_model_key_rejects_traversal() {
        let dir = Path::new("models");
        assert!(ModelKey::resolve(dir, "../secret", dir, None).is_err());
        assert!(ModelKey::resolve(dir, "sub/a.model", dir, None).is_err());
        assert!(ModelKey::resolve(dir, "a.model", dir, Some("/etc/passwd")).is_err());

        let key = ModelKey::resolve(dir, "a.model", Path::new("idx"), Some("a.index")).unwrap();
        assert_eq!(key.model_path(), Path::new("models/a.model"));
        assert_eq!(key.index_path(), Some(Path::new("idx/a.index")));
        assert_eq!(key.model_name(), "a.model");
    }

    #[test]
    fn test_device_resolution() {
        assert_eq!(DevicePreference::Auto.resolve_with(true), ComputeDevice::Cuda(0));
        assert_eq!(DevicePreference::Auto.resolve_with(false), ComputeDevice::Cpu);
        assert_eq!(DevicePreference::Cpu.resolve_with(true), ComputeDevice::Cpu);
        assert_eq!(ComputeDevice::Cuda(0).to_string(), "cuda:0");
    }

    #[test]
    fn test_audio_buffer() {
        assert!(AudioBuffer::new(0, vec![]).is_err());
        let empty = AudioBuffer::empty();
        assert!(empty.is_empty());
        assert_eq!(empty.sample_rate(), DEFAULT_SAMPLE_RATE);

        let buffer = AudioBuffer::new(24000, vec![0.0; 12000]).unwrap();
        assert_eq!(buffer.duration_ms(), 500);
    }
}
