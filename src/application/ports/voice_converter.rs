//! Voice Converter Port - RVC 音色转换抽象
//!
//! 推理引擎只接受文件路径：输入音频文件 → 输出音频文件

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use super::EngineError;
use crate::domain::speech::{ComputeDevice, PitchShift};

/// 模型加载参数
#[derive(Debug, Clone)]
pub struct ModelLoadSpec {
    pub model_path: PathBuf,
    /// 不存在的索引文件在此之前已被剔除
    pub index_path: Option<PathBuf>,
    pub device: ComputeDevice,
}

/// 已加载的转换模型实例
///
/// `&mut self` 保证同一实例不会被两个请求同时使用
#[async_trait]
pub trait VoiceModelPort: Send {
    /// 对 `input` 做音色转换，结果写入 `output`
    async fn infer_file(
        &mut self,
        input: &Path,
        output: &Path,
        pitch: PitchShift,
    ) -> Result<(), EngineError>;
}

/// 模型加载器
#[async_trait]
pub trait VoiceModelLoaderPort: Send + Sync {
    async fn load(&self, spec: &ModelLoadSpec) -> Result<Box<dyn VoiceModelPort>, EngineError>;
}
