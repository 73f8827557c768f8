//! 生成管线
//!
//! - SynthesisStage: 文本 → 音频 + 临时 WAV
//! - ConversionStage: 音频 → 目标音色
//! - PipelineOrchestrator: 组合两者并负责中间产物的生命周期

mod artifact;
mod conversion_stage;
mod orchestrator;
mod synthesis_stage;

pub use artifact::TempArtifact;
pub use conversion_stage::{ConversionStage, ModelDirs};
pub use orchestrator::PipelineOrchestrator;
pub use synthesis_stage::{SynthesisOutput, SynthesisStage};
