//! Model Registry Port - 音色转换模型缓存抽象
//!
//! 不变量:
//! - 同一 ModelKey 在进程生命周期内最多加载一次，所有调用方共享同一句柄
//! - 同一句柄上的“设置音高 + 推理”串行执行

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::{EngineError, VoiceModelPort};
use crate::application::error::PipelineError;
use crate::domain::speech::{ComputeDevice, ModelKey, PitchShift};

/// 句柄内受锁保护的可变状态
struct HandleState {
    model: Box<dyn VoiceModelPort>,
    pitch: PitchShift,
}

/// 已加载模型的句柄
pub struct ModelHandle {
    key: ModelKey,
    device: ComputeDevice,
    index_applied: bool,
    state: Mutex<HandleState>,
}

impl ModelHandle {
    pub fn new(
        key: ModelKey,
        device: ComputeDevice,
        index_applied: bool,
        model: Box<dyn VoiceModelPort>,
    ) -> Self {
        Self {
            key,
            device,
            index_applied,
            state: Mutex::new(HandleState {
                model,
                pitch: PitchShift::default(),
            }),
        }
    }

    pub fn key(&self) -> &ModelKey {
        &self.key
    }

    pub fn device(&self) -> ComputeDevice {
        self.device
    }

    /// 索引文件是否实际参与了加载
    pub fn index_applied(&self) -> bool {
        self.index_applied
    }

    /// 最近一次推理使用的音高
    pub async fn pitch(&self) -> PitchShift {
        self.state.lock().await.pitch
    }

    /// 设置音高并执行推理，整个过程持有句柄锁
    pub async fn infer_file(
        &self,
        input: &Path,
        output: &Path,
        pitch: PitchShift,
    ) -> Result<(), EngineError> {
        let mut state = self.state.lock().await;
        state.pitch = pitch;
        tracing::debug!(
            model = %self.key.model_name(),
            pitch = %state.pitch,
            "Voice model pitch set"
        );
        let pitch = state.pitch;
        state.model.infer_file(input, output, pitch).await
    }
}

impl std::fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelHandle")
            .field("key", &self.key)
            .field("device", &self.device)
            .field("index_applied", &self.index_applied)
            .finish()
    }
}

/// Model Registry Port
#[async_trait]
pub trait ModelRegistryPort: Send + Sync {
    /// 获取（必要时加载）模型句柄
    ///
    /// - 模型文件不存在: `ModelNotFound`，不缓存任何内容
    /// - 加载失败: `ModelLoadFailed`
    async fn acquire(&self, key: &ModelKey) -> Result<Arc<ModelHandle>, PipelineError>;

    /// 是否已缓存
    fn is_cached(&self, key: &ModelKey) -> bool;

    /// 已缓存的键
    fn cached_keys(&self) -> Vec<ModelKey>;
}
