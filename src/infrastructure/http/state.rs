//! Application State

use std::sync::Arc;

use crate::application::{AudioCodecPort, ModelRegistryPort, PipelineOrchestrator};

/// 应用状态
pub struct AppState {
    pub orchestrator: Arc<PipelineOrchestrator>,
    pub registry: Arc<dyn ModelRegistryPort>,
    /// 请求 / 响应音频的 WAV 编解码
    pub codec: Arc<dyn AudioCodecPort>,
}

impl AppState {
    pub fn new(
        orchestrator: Arc<PipelineOrchestrator>,
        registry: Arc<dyn ModelRegistryPort>,
        codec: Arc<dyn AudioCodecPort>,
    ) -> Self {
        Self {
            orchestrator,
            registry,
            codec,
        }
    }
}
